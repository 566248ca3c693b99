//! One accessibility computation per activity type.

use acc_scenario::ActivityFacilities;
use acc_spatial::Router;

use crate::aggregator::{GridAccessibility, OpportunitySet};
use crate::{AccessibilityResult, GridResult, RunObserver};

/// Drives [`GridAccessibility::compute`] over a list of activity types.
///
/// The types are `config.activity_types` when given, otherwise every type
/// offered by some facility except the anchor type.
pub struct ActivityTypeRun<'r, 'a, R: Router> {
    accessibility: &'r GridAccessibility<'a, R>,
    facilities:    &'r ActivityFacilities,
    types:         Vec<String>,
}

impl<'r, 'a, R: Router> ActivityTypeRun<'r, 'a, R> {
    pub fn new(accessibility: &'r GridAccessibility<'a, R>, facilities: &'r ActivityFacilities) -> Self {
        let config = accessibility.config();
        let types = if config.activity_types.is_empty() {
            facilities
                .activity_types()
                .into_iter()
                .filter(|t| *t != config.anchor_type)
                .collect()
        } else {
            config.activity_types.clone()
        };
        Self { accessibility, facilities, types }
    }

    pub fn activity_types(&self) -> &[String] {
        &self.types
    }

    /// Compute every type in order.
    ///
    /// Results reach `observer.on_result` only after every type has been
    /// computed, so an error in any type leaves the observer without results.
    pub fn run<O: RunObserver>(&self, observer: &mut O) -> GridResult<Vec<AccessibilityResult>> {
        let beta_capacity = self.accessibility.config().betas.capacity;

        // ── Validate every opportunity set ────────────────────────────────
        let mut sets = Vec::with_capacity(self.types.len());
        for activity_type in &self.types {
            let opportunities = OpportunitySet::for_type(
                activity_type,
                self.facilities,
                self.accessibility.network(),
                beta_capacity,
            )?;
            if opportunities.is_empty() {
                log::warn!("no facility offers {activity_type:?}; its accessibility is zero everywhere");
            }
            sets.push(opportunities);
        }

        // ── Compute ───────────────────────────────────────────────────────
        let mut results = Vec::with_capacity(sets.len());
        for opportunities in &sets {
            observer.on_type_start(opportunities.activity_type(), opportunities.len());
            results.push(self.accessibility.compute(opportunities, self.facilities)?);
        }

        // ── Report ────────────────────────────────────────────────────────
        for result in &results {
            observer.on_result(result);
        }
        log::info!("accessibility computed for {} activity types", results.len());
        observer.on_run_end(results.len());
        Ok(results)
    }
}
