//! Which collectable slots the model may fill in the current turn.

use super::tracker::DialogueTracker;
use crate::flows::{CollectInformationStep, FlowStep};

/// Decides whether the slot collected by `collect_step` may be filled now.
///
/// The slot must exist. It is then fillable when the step allows filling
/// ahead of time, when the slot has been set before, or when `current_step`
/// is the step asking for this very slot.
pub fn is_extractable<T>(
    collect_step: &CollectInformationStep,
    tracker: &T,
    current_step: Option<&FlowStep>,
) -> bool
where
    T: DialogueTracker + ?Sized,
{
    let Some(slot) = tracker.slot(&collect_step.collect) else {
        return false;
    };

    !collect_step.ask_before_filling
        || slot.has_been_set
        || current_step
            .and_then(FlowStep::as_collect)
            .is_some_and(|current| current.collect == collect_step.collect)
}
