//! Workspace-level end-to-end scenarios (§8). Each test wires a full
//! in-memory orchestrator — `DefinitionOrchestrator` + `JobProcessor` +
//! `LogService` over `joborc-storage`'s in-memory backends — and drains it
//! to a fixed point, so these run without a daemon process or sockets.

mod specs {
    mod child_failure_with_stop;
    mod cursor_pagination;
    mod deletion_under_fast_execution;
    mod log_ordering_under_concurrency;
    mod startup_recovery;
    mod support;
    mod two_step_crawl;
}
