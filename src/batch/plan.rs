//! Campaign arithmetic for a single run.

use serde::Serialize;

use crate::domain::ATTEMPTS_PER_BOLT;

/// Which slice of the campaign this run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    pub last_bolt: u32,
    pub campaign_size: u32,
    pub batch_size: u32,
    pub remaining: u32,
    pub bolts_to_create: u32,
    /// First sequence number of this run (1-based).
    pub start_bolt: u32,
    /// Last sequence number if every bolt succeeds.
    pub end_bolt: u32,
    /// 1-based batch index (`last_bolt / batch_size + 1`).
    pub batch_number: u32,
    pub total_batches: u32,
}

impl BatchPlan {
    pub fn new(last_bolt: u32, campaign_size: u32, batch_size: u32) -> Self {
        let remaining = campaign_size.saturating_sub(last_bolt);
        let bolts_to_create = batch_size.min(remaining);
        let batch_size_nz = batch_size.max(1);
        Self {
            last_bolt,
            campaign_size,
            batch_size,
            remaining,
            bolts_to_create,
            start_bolt: last_bolt.saturating_add(1),
            end_bolt: last_bolt.saturating_add(bolts_to_create),
            batch_number: (last_bolt / batch_size_nz).saturating_add(1),
            total_batches: campaign_size.div_ceil(batch_size_nz),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Attempt cap that absorbs discarded bolts.
    pub fn max_attempts(&self) -> u32 {
        self.bolts_to_create.saturating_mul(ATTEMPTS_PER_BOLT)
    }

    /// Plan of the following run once `built` bolts have been added.
    pub fn advance(&self, built: u32) -> BatchPlan {
        BatchPlan::new(self.last_bolt.saturating_add(built), self.campaign_size, self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resumes_late_in_the_campaign() {
        let plan = BatchPlan::new(760, 1000, 250);
        assert_eq!(plan.bolts_to_create, 240);
        assert_eq!(plan.start_bolt, 761);
        assert_eq!(plan.end_bolt, 1000);
        assert_eq!(plan.batch_number, 4);
        assert_eq!(plan.total_batches, 4);
        assert_eq!(plan.max_attempts(), 720);
        assert!(!plan.is_complete());
    }

    #[test]
    fn fresh_campaign_takes_a_full_batch() {
        let plan = BatchPlan::new(0, 1000, 250);
        assert_eq!((plan.start_bolt, plan.end_bolt), (1, 250));
        assert_eq!(plan.batch_number, 1);

        let next = plan.advance(250);
        assert_eq!((next.start_bolt, next.end_bolt), (251, 500));
        assert_eq!(next.batch_number, 2);
    }

    #[test]
    fn finished_campaign_is_complete() {
        assert!(BatchPlan::new(1000, 1000, 250).is_complete());
        let over = BatchPlan::new(1200, 1000, 250);
        assert!(over.is_complete());
        assert_eq!(over.bolts_to_create, 0);
    }

    #[test]
    fn out_of_range_last_bolt_reads_as_complete() {
        let plan = BatchPlan::new(u32::MAX, 1000, 250);
        assert!(plan.is_complete());
        assert_eq!(plan.start_bolt, u32::MAX);
        assert_eq!(plan.end_bolt, u32::MAX);
        assert_eq!(plan.advance(3).last_bolt, u32::MAX);
    }
}
