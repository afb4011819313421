//! Property-based tests for balance-atomic using quickcheck.

use balance_atomic::PipelineCounters;
use quickcheck_macros::quickcheck;

#[quickcheck]
fn prop_received_counts_every_message(messages: u8) -> bool {
    let counters = PipelineCounters::new();
    for _ in 0..messages {
        counters.inc_received();
    }
    counters.snapshot().messages_received == u64::from(messages)
}

#[quickcheck]
fn prop_drop_rate_within_bounds(ok: u8, bad: u8) -> bool {
    let counters = PipelineCounters::new();
    for _ in 0..ok {
        counters.inc_received();
        counters.inc_sample_written();
    }
    for _ in 0..bad {
        counters.inc_received();
        counters.inc_decode_error();
    }
    let pct = counters.snapshot().drop_rate_percent();
    (0.0..=100.0).contains(&pct)
}

#[quickcheck]
fn prop_reset_clears_everything(attempts: u8, failures: u8) -> bool {
    let counters = PipelineCounters::new();
    for _ in 0..attempts {
        counters.inc_publish_attempt();
    }
    for _ in 0..failures {
        counters.inc_publish_failure();
    }

    let first = counters.snapshot_and_reset();
    let second = counters.snapshot();

    first.publish_attempts == u64::from(attempts)
        && first.publish_failures == u64::from(failures)
        && second.publish_attempts == 0
        && second.publish_failures == 0
}
