use std::sync::{Arc, Mutex};

use bunnymark_harness::benchmark::BenchmarkSession;
use bunnymark_harness::config::HarnessConfig;
use bunnymark_harness::metrics::{NoMemoryProbe, ReportSink};
use bunnymark_harness::runtime::VirtualScheduler;
use bunnymark_harness::state::HarnessMode;

/// Report sink the test keeps a handle to
#[derive(Clone, Default)]
pub struct SharedSink(pub Arc<Mutex<Vec<String>>>);

impl SharedSink {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ReportSink for SharedSink {
    fn write_line(&mut self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

/// 100 Hz refresh and 10us of render cost per bunny: healthy until roughly
/// 1,600 bunnies.
pub fn config(mode: HarnessMode) -> HarnessConfig {
    HarnessConfig {
        label: "virtual".into(),
        environment: "test".into(),
        mode,
        frame_interval_ms: 10.0,
        virtual_frame_cost_us_per_bunny: 10.0,
        save_results: false,
        ..Default::default()
    }
}

pub fn start(config: &HarnessConfig) -> (BenchmarkSession, VirtualScheduler, SharedSink) {
    let sink = SharedSink::default();
    let mut session =
        BenchmarkSession::new(config, Box::new(NoMemoryProbe), Box::new(sink.clone()));
    let mut scheduler = VirtualScheduler::from_config(config);
    session.start(&mut scheduler, Some(1.0));
    (session, scheduler, sink)
}
