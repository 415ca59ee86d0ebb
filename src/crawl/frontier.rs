// src/crawl/frontier.rs
// =============================================================================
// The frontier: every link identifier that has already been scheduled.
//
// try_claim() is a single atomic check-and-insert, so when several parse
// workers find the same link at the same moment exactly one of them wins
// and schedules the fetch. This is the only thing stopping the crawler
// from looping forever around cycles in the link graph.
// =============================================================================

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct FrontierSet {
    claimed: DashSet<String>,
}

impl FrontierSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true the first time `id` is presented, false afterwards
    //
    // DashSet::insert locks the shard that owns `id` for the duration of the
    // lookup + insert, so concurrent callers with the same id are serialized.
    pub fn try_claim(&self, id: &str) -> bool {
        if self.claimed.contains(id) {
            return false;
        }
        self.claimed.insert(id.to_string())
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.claimed.contains(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_claim_only_once() {
        let frontier = FrontierSet::new();
        assert!(frontier.try_claim("/wiki/Rust"));
        assert!(!frontier.try_claim("/wiki/Rust"));
        assert!(frontier.try_claim("/wiki/Go"));
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        const THREADS: usize = 32;

        for _ in 0..20 {
            let frontier = Arc::new(FrontierSet::new());
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let frontier = Arc::clone(&frontier);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        frontier.try_claim("/wiki/Same")
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();

            assert_eq!(winners, 1);
            assert!(frontier.contains("/wiki/Same"));
        }
    }
}
