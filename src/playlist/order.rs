use rand::Rng;
use rand::seq::SliceRandom;

/// A permutation of catalog indices defining the playback sequence.
///
/// Always holds exactly one entry per catalog track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayOrder {
    indices: Vec<usize>,
    shuffled: bool,
}

impl PlayOrder {
    /// The identity permutation over `len` tracks.
    pub fn sequential(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
            shuffled: false,
        }
    }

    /// A uniformly random permutation over `len` tracks.
    pub fn shuffled<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        Self {
            indices,
            shuffled: true,
        }
    }

    /// A random permutation in which `track` sits at `position`.
    ///
    /// Used when shuffle is switched on mid-playback so the audible track and
    /// the cursor stay put. `position` is clamped to the last slot.
    pub fn shuffled_keeping<R: Rng + ?Sized>(
        len: usize,
        track: usize,
        position: usize,
        rng: &mut R,
    ) -> Self {
        if track >= len {
            return Self::shuffled(len, rng);
        }

        let mut indices: Vec<usize> = (0..len).filter(|&i| i != track).collect();
        indices.shuffle(rng);
        indices.insert(position.min(indices.len()), track);
        Self {
            indices,
            shuffled: true,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Catalog index at `position`.
    pub fn get(&self, position: usize) -> Option<usize> {
        self.indices.get(position).copied()
    }

    /// Position of catalog index `track` within the order.
    pub fn position_of(&self, track: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == track)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Position after `position`, wrapping to 0 past the end.
    pub fn next_position(&self, position: usize) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        (position + 1) % self.indices.len()
    }

    /// Position before `position`, wrapping to the last slot before the start.
    pub fn previous_position(&self, position: usize) -> usize {
        match position {
            _ if self.indices.is_empty() => 0,
            0 => self.indices.len() - 1,
            p => p.min(self.indices.len()) - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn is_permutation(order: &PlayOrder, len: usize) -> bool {
        let mut sorted = order.as_slice().to_vec();
        sorted.sort_unstable();
        sorted == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn sequential_is_identity() {
        let order = PlayOrder::sequential(4);
        assert_eq!(order.as_slice(), &[0, 1, 2, 3]);
        assert!(!order.is_shuffled());
        assert_eq!(order.position_of(2), Some(2));
        assert_eq!(order.position_of(9), None);
    }

    #[test]
    fn positions_wrap_both_ways() {
        let order = PlayOrder::sequential(3);
        assert_eq!(order.next_position(0), 1);
        assert_eq!(order.next_position(2), 0);
        assert_eq!(order.previous_position(0), 2);
        assert_eq!(order.previous_position(2), 1);
    }

    #[test]
    fn empty_order_positions_stay_at_zero() {
        let order = PlayOrder::sequential(0);
        assert!(order.is_empty());
        assert_eq!(order.next_position(0), 0);
        assert_eq!(order.previous_position(0), 0);
        assert_eq!(order.get(0), None);
    }

    #[test]
    fn shuffled_keeping_out_of_range_track_still_permutes() {
        let mut rng = StdRng::seed_from_u64(7);
        let order = PlayOrder::shuffled_keeping(5, 42, 1, &mut rng);
        assert!(is_permutation(&order, 5));
        assert!(order.is_shuffled());
    }

    proptest! {
        #[test]
        fn shuffled_is_always_a_permutation(len in 0usize..200, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let order = PlayOrder::shuffled(len, &mut rng);
            prop_assert_eq!(order.len(), len);
            prop_assert!(is_permutation(&order, len));
        }

        #[test]
        fn shuffled_keeping_pins_track_at_position(
            len in 1usize..200,
            track_seed in any::<usize>(),
            pos_seed in any::<usize>(),
            seed in any::<u64>(),
        ) {
            let track = track_seed % len;
            let position = pos_seed % len;
            let mut rng = StdRng::seed_from_u64(seed);

            let order = PlayOrder::shuffled_keeping(len, track, position, &mut rng);
            prop_assert!(is_permutation(&order, len));
            prop_assert_eq!(order.get(position), Some(track));
        }

        #[test]
        fn next_then_previous_is_identity(len in 1usize..100, pos_seed in any::<usize>()) {
            let order = PlayOrder::sequential(len);
            let pos = pos_seed % len;
            prop_assert_eq!(order.previous_position(order.next_position(pos)), pos);
            prop_assert_eq!(order.next_position(order.previous_position(pos)), pos);
        }
    }
}
