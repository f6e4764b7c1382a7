//! Read-modify-write glue between the scheduler, a store and a clock.

use crate::catalog::VocabularyItem;
use crate::clock::Clock;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::stats::ProgressStats;
use crate::store::ReviewStore;
use crate::types::{Performance, ReviewState, ReviewStatus};

/// Study session helper for one learner's store.
///
/// `review` is a get followed by a put; two concurrent reviews of the same
/// item through different services can lose one of the grades.
pub struct ReviewService<S, C> {
    scheduler: Scheduler,
    store: S,
    clock: C,
}

impl<S: ReviewStore, C: Clock> ReviewService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_scheduler(Scheduler::default(), store, clock)
    }

    pub fn with_scheduler(scheduler: Scheduler, store: S, clock: C) -> Self {
        Self {
            scheduler,
            store,
            clock,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Grade an item and persist its new state.
    pub fn review(&self, key: &str, performance: Performance) -> Result<ReviewState> {
        let current = self.store.get(key)?;
        let next = self
            .scheduler
            .grade(current.as_ref(), performance, self.clock.now());
        self.store.put(key, next.clone())?;
        Ok(next)
    }

    pub fn status(&self, key: &str) -> Result<ReviewStatus> {
        let state = self.store.get(key)?;
        Ok(self
            .scheduler
            .describe_status(state.as_ref(), self.clock.now()))
    }

    /// Items to study next, most urgent first. With `only_due`, items that
    /// are not yet due are left out; `limit` caps the result length.
    pub fn queue(
        &self,
        items: &[VocabularyItem],
        only_due: bool,
        limit: Option<usize>,
    ) -> Result<Vec<VocabularyItem>> {
        let snapshot = self.store.all()?;
        let now = self.clock.now();

        let candidates = items
            .iter()
            .filter(|item| !only_due || self.scheduler.is_due(snapshot.get(&item.key()), now));
        let mut ordered = self
            .scheduler
            .prioritize(candidates, |item| snapshot.get(&item.key()), now);

        if let Some(limit) = limit {
            ordered.truncate(limit);
        }
        Ok(ordered.into_iter().cloned().collect())
    }

    pub fn stats(&self, items: &[VocabularyItem]) -> Result<ProgressStats> {
        let snapshot = self.store.all()?;
        Ok(ProgressStats::summarize(
            items.iter().map(VocabularyItem::key),
            |key| snapshot.get(key),
            self.clock.now(),
        ))
    }

    /// Forget all progress.
    pub fn reset(&self) -> Result<()> {
        self.store.clear()
    }
}
