//! Double-buffered message arena.
//!
//! Each family (messages into cities, messages into facilities) lives in one
//! flat `Vec<f64>`. The messages received by a node form one contiguous
//! block, so a sweep can hand each node its own `&mut` block.
//!
//! | family | block of node `n` | message from slot `k` |
//! |---|---|---|
//! | into city `c` | `width(c) · deg(c)` entries | `offset(c) + k·width(c)` |
//! | into facility `f` | `2 · deg(f)` entries | `offset(f) + 2k` |
//!
//! `width(c)` is `deg(c)` when the city state is "which neighbor serves me"
//! and 2 when it is the binary "served by this neighbor or not".

use crate::graph::Adjacency;

/// Block offsets for both message families.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    city_offsets: Vec<usize>,
    city_width: Vec<usize>,
    facility_offsets: Vec<usize>,
}

impl BlockLayout {
    fn new(adjacency: &Adjacency, city_width: impl Fn(usize) -> usize) -> Self {
        let mut city_offsets = Vec::with_capacity(adjacency.city_count() + 1);
        let mut widths = Vec::with_capacity(adjacency.city_count());
        city_offsets.push(0);
        for c in 0..adjacency.city_count() {
            let d = adjacency.city_degree(c);
            let w = city_width(d);
            widths.push(w);
            city_offsets.push(city_offsets[c] + d * w);
        }
        let mut facility_offsets = Vec::with_capacity(adjacency.facility_count() + 1);
        facility_offsets.push(0);
        for f in 0..adjacency.facility_count() {
            facility_offsets.push(facility_offsets[f] + 2 * adjacency.facility_degree(f));
        }
        Self {
            city_offsets,
            city_width: widths,
            facility_offsets,
        }
    }

    fn city_len(&self) -> usize {
        self.city_offsets.last().copied().unwrap_or(0)
    }

    fn facility_len(&self) -> usize {
        self.facility_offsets.last().copied().unwrap_or(0)
    }

    /// Entries per message into `city`.
    #[inline]
    pub fn city_width(&self, city: usize) -> usize {
        self.city_width[city]
    }
}

#[derive(Debug, Clone)]
struct Buffers {
    to_city: Vec<f64>,
    to_facility: Vec<f64>,
}

/// Read-only view of one buffer generation.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    layout: &'a BlockLayout,
    to_city: &'a [f64],
    to_facility: &'a [f64],
}

impl<'a> MessageView<'a> {
    /// Message into `city` from the facility at `slot` of its list.
    #[inline]
    pub fn to_city(&self, city: usize, slot: usize) -> &'a [f64] {
        let w = self.layout.city_width[city];
        let start = self.layout.city_offsets[city] + slot * w;
        &self.to_city[start..start + w]
    }

    /// Message into `facility` from the city at `slot` of its list,
    /// indexed `[closed, open]`.
    #[inline]
    pub fn to_facility(&self, facility: usize, slot: usize) -> &'a [f64] {
        let start = self.layout.facility_offsets[facility] + 2 * slot;
        &self.to_facility[start..start + 2]
    }

    /// All messages into `city`, slot-major.
    pub fn city_block(&self, city: usize) -> &'a [f64] {
        &self.to_city[self.layout.city_offsets[city]..self.layout.city_offsets[city + 1]]
    }

    /// All messages into `facility`, slot-major.
    pub fn facility_block(&self, facility: usize) -> &'a [f64] {
        &self.to_facility
            [self.layout.facility_offsets[facility]..self.layout.facility_offsets[facility + 1]]
    }
}

/// Mutable per-node blocks of the shadow buffer, plus a view of the
/// current generation to read from.
pub(crate) struct SweepBuffers<'a> {
    pub current: MessageView<'a>,
    pub next_city: Vec<&'a mut [f64]>,
    pub next_facility: Vec<&'a mut [f64]>,
}

/// Message storage for one solver. All messages start at zero.
#[derive(Debug, Clone)]
pub struct MessageStore {
    layout: BlockLayout,
    current: Buffers,
    next: Buffers,
}

impl MessageStore {
    /// City messages indexed by "which neighbor serves this city".
    pub fn full(adjacency: &Adjacency) -> Self {
        Self::with_layout(BlockLayout::new(adjacency, |d| d))
    }

    /// City messages indexed by "served by the sender or not".
    pub fn binary(adjacency: &Adjacency) -> Self {
        Self::with_layout(BlockLayout::new(adjacency, |_| 2))
    }

    fn with_layout(layout: BlockLayout) -> Self {
        let zeros = Buffers {
            to_city: vec![0.0; layout.city_len()],
            to_facility: vec![0.0; layout.facility_len()],
        };
        Self {
            layout,
            current: zeros.clone(),
            next: zeros,
        }
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// The current generation.
    pub fn view(&self) -> MessageView<'_> {
        MessageView {
            layout: &self.layout,
            to_city: &self.current.to_city,
            to_facility: &self.current.to_facility,
        }
    }

    /// Total number of stored entries in one generation.
    pub fn len(&self) -> usize {
        self.current.to_city.len() + self.current.to_facility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn sweep_buffers(&mut self) -> SweepBuffers<'_> {
        let current = MessageView {
            layout: &self.layout,
            to_city: &self.current.to_city,
            to_facility: &self.current.to_facility,
        };
        SweepBuffers {
            current,
            next_city: split_blocks(&mut self.next.to_city, &self.layout.city_offsets),
            next_facility: split_blocks(&mut self.next.to_facility, &self.layout.facility_offsets),
        }
    }

    /// Promotes the shadow buffer to the current generation.
    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Zeros both generations.
    pub(crate) fn clear(&mut self) {
        for buf in [&mut self.current, &mut self.next] {
            buf.to_city.iter_mut().for_each(|v| *v = 0.0);
            buf.to_facility.iter_mut().for_each(|v| *v = 0.0);
        }
    }
}

fn split_blocks<'a>(data: &'a mut [f64], offsets: &[usize]) -> Vec<&'a mut [f64]> {
    let mut rest = data;
    let mut blocks = Vec::with_capacity(offsets.len().saturating_sub(1));
    for w in offsets.windows(2) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(w[1] - w[0]);
        blocks.push(head);
        rest = tail;
    }
    blocks
}
