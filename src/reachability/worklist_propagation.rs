use crate::log_space;
use crate::reachability::transfer::traverse;
use crate::reachability::{ReachabilityConfig, ReachabilityResult, ReachabilityState};
use cancel_this::{Cancelled, is_cancelled};
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::{debug, info, trace};

/// A [`ComputationStep`] that processes one dirty state of the work-list per step, pushing
/// its reached header space across all outgoing edges.
///
/// The reached spaces only grow and are bounded by the full header space, so the work-list
/// eventually drains, at which point the reached map is the least fixpoint.
pub struct WorklistPropagation;

impl ComputationStep<ReachabilityConfig, ReachabilityState, ReachabilityResult>
    for WorklistPropagation
{
    fn step(
        context: &ReachabilityConfig,
        state: &mut ReachabilityState,
    ) -> Completable<ReachabilityResult> {
        is_cancelled!()?;

        // Draining the work-list does not count against the limit.
        if state.pending() > 0 && state.iteration >= context.max_iterations {
            debug!(
                "[iteration:{}] Propagation canceled (exceeded iteration count).",
                state.iteration
            );

            return Err(Cancelled::new("ReachabilityConfig::max_iterations").into());
        }

        let Some(source) = state.pop_dirty() else {
            info!(
                "[iteration:{}] Propagation finished with {} reached states.",
                state.iteration,
                state.reached.len()
            );

            return Ok(ReachabilityResult::new(
                context.graph.clone(),
                state.reached.clone(),
            ));
        };

        state.iteration += 1;

        let Some(space) = state.reached.get(&source).cloned() else {
            return Err(Suspended);
        };

        let packet = context.graph.packet();
        let mut updated = 0usize;
        for edge in context.graph.successors(&source) {
            let contribution = traverse(packet, edge, &space);
            if state.extend(edge.to(), &contribution) {
                updated += 1;
                trace!(
                    "{} -> {} contributed ({}).",
                    source,
                    edge.to(),
                    log_space(&contribution)
                );
            }
        }

        debug!(
            "[iteration:{}] Processed {} ({}); {} successors grew, {} states pending.",
            state.iteration,
            source,
            log_space(&space),
            updated,
            state.pending()
        );

        Err(Suspended)
    }
}
