//! # Threshold Router Demo
//!
//! The classic three-handler chain, expressed as rules: A takes small
//! requests, B takes medium ones, C takes large ones, and a default
//! action catches everything else. Ends with a two-state mode machine
//! driven entirely by rule actions flipping external state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use switchyard_core::{tap_fn, Engine, RuleSpec};

fn main() -> Result<()> {
    // Observe every dispatch the way a notification sink would.
    let engine: Engine<i32, String> = Engine::builder()
        .with_tap(tap_fn(|record: switchyard_core::DispatchRecord<'_, i32>| {
            println!(
                "  [tap] request={} rule={} outcome={:?}",
                record.request,
                record.rule.unwrap_or("-"),
                record.outcome,
            );
        }))
        .with_default_action(|x| format!("no handler wanted {x}"))
        .build();

    engine.register(
        RuleSpec::new("handler-a", 1)
            .when(|x: &i32| *x < 10)
            .then(|x| format!("Handler A handled request: {x}")),
    )?;
    engine.register(
        RuleSpec::new("handler-b", 2)
            .when(|x: &i32| (10..20).contains(x))
            .then(|x| format!("Handler B handled request: {x}")),
    )?;
    engine.register(
        RuleSpec::new("handler-c", 3)
            .when(|x: &i32| *x >= 20)
            .then(|x| format!("Handler C handled request: {x}")),
    )?;

    println!("Registered rules:");
    for info in engine.rules() {
        println!("  {} (priority {})", info.name, info.priority);
    }

    println!("\nDispatching the classic request batch:");
    for request in [5, 15, 25, 8, 18, -1] {
        if let Some(result) = engine.dispatch(&request).handled() {
            println!("{result}");
        }
    }

    // State-pattern relative: the matched action flips an external mode,
    // and the next dispatch routes to the other rule.
    println!("\nMode machine:");
    let machine: Engine<(), &str> = Engine::new();
    let mode_a = Arc::new(AtomicBool::new(true));

    let (pred, act) = (Arc::clone(&mode_a), Arc::clone(&mode_a));
    machine.register(
        RuleSpec::new("state-a", 1)
            .when(move |_| pred.load(Ordering::SeqCst))
            .then(move |_| {
                act.store(false, Ordering::SeqCst);
                "State A handling request. Changing to State B."
            }),
    )?;

    let (pred, act) = (Arc::clone(&mode_a), Arc::clone(&mode_a));
    machine.register(
        RuleSpec::new("state-b", 1)
            .when(move |_| !pred.load(Ordering::SeqCst))
            .then(move |_| {
                act.store(true, Ordering::SeqCst);
                "State B handling request. Changing to State A."
            }),
    )?;

    for _ in 0..4 {
        if let Some(line) = machine.dispatch(&()).handled() {
            println!("{line}");
        }
    }

    Ok(())
}
