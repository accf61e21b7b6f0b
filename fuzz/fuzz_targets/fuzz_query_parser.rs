#![no_main]

use libfuzzer_sys::fuzz_target;
use rangeq::catalog::TagCatalog;
use rangeq::config::EngineConfig;
use rangeq::engine::QueryEngine;

fuzz_target!(|data: &str| {
    // Any text must either parse into a well-formed expression or report an error
    let Ok(catalog) = TagCatalog::builtin("gait") else {
        return;
    };
    let mut engine = QueryEngine::new(catalog, EngineConfig::default());
    let outcome = engine.query(data);
    if let Some(expr) = &outcome.expression {
        assert!(expr.is_well_formed());
    }
});
