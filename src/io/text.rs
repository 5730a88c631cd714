//! Plain-text instance format.
//!
//! ```text
//! <facility_count> <city_count> 0
//! <facility_1_based> <construction_cost> <dist_1> ... <dist_city_count>
//! ...
//! ```
//!
//! Values are written with six decimals. An infeasible distance is written
//! as `999999.000000`, and any value at or above [`INFEASIBLE_MARKER`] reads
//! back as infeasible.

use std::io::{BufRead, Write};

use crate::cost::{self, INFEASIBLE};
use crate::distance::DistanceMatrix;
use crate::error::{FacilityError, Result};
use crate::models::{FacilityLocationProblem, ProblemInstance};

/// Stand-in written for an infeasible distance.
pub const INFEASIBLE_MARKER: f64 = 999999.0;

/// Writes `problem` in the text format.
pub fn write_problem<P, W>(problem: &P, out: &mut W) -> Result<()>
where
    P: FacilityLocationProblem + ?Sized,
    W: Write,
{
    out.write_all(to_text(problem).as_bytes())?;
    Ok(())
}

/// Renders `problem` to a string in the text format.
pub fn to_text<P>(problem: &P) -> String
where
    P: FacilityLocationProblem + ?Sized,
{
    let cities = problem.city_count();
    let facilities = problem.facility_count();
    let mut text = format!("{} {} 0\n", facilities, cities);
    for j in 0..facilities {
        text.push_str(&format!("{} {:.6}", j + 1, problem.construction_cost(j)));
        for i in 0..cities {
            let mut d = problem.distance(i, j);
            if cost::is_infeasible(d) {
                d = INFEASIBLE_MARKER;
            }
            text.push_str(&format!(" {:.6}", d));
        }
        text.push('\n');
    }
    text
}

/// Reads an instance in the text format.
///
/// Blank lines are ignored. Every facility must appear exactly once.
///
/// # Examples
///
/// ```
/// use u_facility::io::read_problem;
/// use u_facility::models::FacilityLocationProblem;
///
/// let text = "2 1 0\n1 3.000000 0.500000\n2 1.000000 999999.000000\n";
/// let p = read_problem(text.as_bytes()).unwrap();
/// assert_eq!(p.facility_count(), 2);
/// assert_eq!(p.city_count(), 1);
/// assert!(p.distance(0, 1).is_infinite());
/// ```
pub fn read_problem<R: BufRead>(input: R) -> Result<ProblemInstance> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(n, l)| l.map(|l| (n + 1, l)));

    let (facilities, cities) = loop {
        match lines.next() {
            Some(line) => {
                let (n, line) = line?;
                if line.trim().is_empty() {
                    continue;
                }
                break parse_header(n, &line)?;
            }
            None => {
                return Err(FacilityError::Parse {
                    line: 0,
                    message: "missing header".into(),
                })
            }
        }
    };

    let mut cost = vec![0.0; facilities];
    let mut seen = vec![false; facilities];
    let mut distances = DistanceMatrix::new(cities, facilities);

    for line in lines {
        let (n, line) = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let index: usize = parse_token(n, tokens.next(), "facility index")?;
        if index == 0 || index > facilities {
            return Err(parse_error(n, format!("facility index {} out of range", index)));
        }
        let j = index - 1;
        if seen[j] {
            return Err(parse_error(n, format!("facility {} listed twice", index)));
        }
        seen[j] = true;
        cost[j] = parse_token(n, tokens.next(), "construction cost")?;

        let row: Vec<&str> = tokens.collect();
        if row.len() != cities {
            return Err(parse_error(
                n,
                format!("expected {} distances, found {}", cities, row.len()),
            ));
        }
        for (i, tok) in row.into_iter().enumerate() {
            let mut d: f64 = parse_token(n, Some(tok), "distance")?;
            if d >= INFEASIBLE_MARKER {
                d = INFEASIBLE;
            }
            distances.set(i, j, d);
        }
    }

    if let Some(j) = seen.iter().position(|&s| !s) {
        return Err(FacilityError::Parse {
            line: 0,
            message: format!("facility {} missing", j + 1),
        });
    }

    ProblemInstance::new(cost, distances)
}

/// Parses an instance from a string.
pub fn from_text(text: &str) -> Result<ProblemInstance> {
    read_problem(text.as_bytes())
}

fn parse_header(n: usize, line: &str) -> Result<(usize, usize)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 || tokens[2] != "0" {
        return Err(parse_error(n, format!("bad header: {}", line)));
    }
    let facilities = parse_token(n, Some(tokens[0]), "facility count")?;
    let cities = parse_token(n, Some(tokens[1]), "city count")?;
    Ok((facilities, cities))
}

fn parse_token<T: std::str::FromStr>(n: usize, token: Option<&str>, what: &str) -> Result<T> {
    let token = token.ok_or_else(|| parse_error(n, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| parse_error(n, format!("bad {}: {}", what, token)))
}

fn parse_error(line: usize, message: String) -> FacilityError {
    FacilityError::Parse { line, message }
}
