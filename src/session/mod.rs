//! Iteration telemetry session.
//!
//! One [`IterationSession`] per benchmark run. The host drives it through
//! `start → {begin_iteration → report_* → end_iteration}* → end`. Every call
//! runs on the benchmark thread and returns after at most one transport send.
//!
//! Once the [`ThresholdPolicy`] declares the run compromised, the session
//! sends the abort message, flushes the local log, releases the transport and
//! hands control to its [`Terminator`], which by default exits the process.

mod builder;
mod state;
mod terminator;

use std::time::Instant;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::Span;

use crate::config::{ConfigError, SessionOptions};
use crate::policy::{DetailVerdict, KillReason, ThresholdPolicy, Verdict};
use crate::sink::{self, LocalLogSink, SinkError};
use crate::telemetry::{metrics, SessionSpan, SpanExt};
use crate::transport::{
    Frame, HeaderPayload, MessageType, Transport, TransportError, TransportKind,
};

pub use builder::SessionBuilder;
pub use state::SessionState;
pub use terminator::{ProcessExit, ReportOnly, Terminator, KILL_EXIT_CODE};

/// Terminal marker for a run without recorded errors.
pub const NORMAL_END_MARKER: &str = "#END";
/// Terminal marker for a run that recorded errors.
pub const SDC_END_MARKER: &str = "#END #SDC";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Local log error: {0}")]
    Sink(#[from] SinkError),

    #[error("Session is {0}")]
    Inactive(SessionState),

    #[error("Threshold exceeded: {0}")]
    ThresholdExceeded(KillReason),
}

/// Per-run telemetry state and the only owner of the transport and local log.
pub struct IterationSession {
    benchmark_name: String,
    header: String,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
    transport_kind: TransportKind,
    sink: Option<LocalLogSink>,
    policy: ThresholdPolicy,
    terminator: Box<dyn Terminator>,
    span: Span,
    log_file_name: String,

    iteration_number: usize,
    iter_interval_print: usize,
    kernel_time: f64,
    kernel_time_acc: f64,
    it_time_start: Instant,

    kernels_total_errors: usize,
    kernels_total_infos: usize,
    log_error_detail_counter: usize,
    log_info_detail_counter: usize,
    dropped_details: usize,
    contract_violations: usize,
}

impl IterationSession {
    pub fn builder(benchmark_name: impl Into<String>, test_info: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(benchmark_name, test_info)
    }

    /// Start a session with the configuration file at its default location.
    pub fn start(
        benchmark_name: impl Into<String>,
        test_info: impl Into<String>,
    ) -> Result<Self, SessionError> {
        SessionBuilder::new(benchmark_name, test_info).start()
    }

    fn new(
        benchmark_name: String,
        header: String,
        options: &SessionOptions,
        transport: Box<dyn Transport>,
        sink: Option<LocalLogSink>,
        terminator: Box<dyn Terminator>,
        log_file_name: String,
    ) -> Self {
        let span = SessionSpan::new(&benchmark_name);
        span.record("log_file", log_file_name.as_str());
        Self {
            benchmark_name,
            header,
            state: SessionState::Started,
            transport_kind: transport.kind(),
            transport: Some(transport),
            sink,
            policy: ThresholdPolicy::new(options),
            terminator,
            span,
            log_file_name,
            iteration_number: 0,
            iter_interval_print: options.iter_interval_print.max(1),
            kernel_time: 0.0,
            kernel_time_acc: 0.0,
            it_time_start: Instant::now(),
            kernels_total_errors: 0,
            kernels_total_infos: 0,
            log_error_detail_counter: 0,
            log_info_detail_counter: 0,
            dropped_details: 0,
            contract_violations: 0,
        }
    }

    /// Send `CREATE_HEADER` and write the local log preamble.
    fn announce(&mut self, now: &DateTime<Local>) -> Result<(), SessionError> {
        let payload = HeaderPayload::encode(&self.benchmark_name, &self.header).map_err(|_| {
            ConfigError::BenchmarkNameTooLong {
                len: self.benchmark_name.len(),
            }
        })?;
        self.send(Frame::new(MessageType::CreateHeader, &payload));
        let header_line = format!("#HEADER {}", self.header);
        self.append_local(&header_line);
        self.append_local(&sink::begin_line(now));
        tracing::info!(
            parent: &self.span,
            transport = self.transport_kind.as_str(),
            "telemetry session started"
        );
        Ok(())
    }

    // -- lifecycle ---------------------------------------------------------

    /// Reset the per-iteration detail budget and start the kernel timer.
    pub fn begin_iteration(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Started | SessionState::IterationIdle => {}
            SessionState::IterationActive => {
                self.contract_violation("begin_iteration called twice without end_iteration")
            }
            state => return Err(SessionError::Inactive(state)),
        }
        self.log_error_detail_counter = 0;
        self.log_info_detail_counter = 0;
        self.it_time_start = Instant::now();
        self.state = SessionState::IterationActive;
        Ok(())
    }

    /// Stop the kernel timer, emit timing if this iteration is due, and
    /// advance the iteration counter.
    pub fn end_iteration(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::IterationActive => {}
            SessionState::Started | SessionState::IterationIdle => {
                self.contract_violation("end_iteration without begin_iteration")
            }
            state => return Err(SessionError::Inactive(state)),
        }
        self.kernel_time = self.it_time_start.elapsed().as_secs_f64();
        self.kernel_time_acc += self.kernel_time;

        if self.iteration_number % self.iter_interval_print == 0 {
            let line = format!(
                "#IT Ite:{} KerTime:{:.6} AccTime:{:.6}",
                self.iteration_number, self.kernel_time, self.kernel_time_acc
            );
            self.send(Frame::text(MessageType::IterationTime, &line));
            self.append_local(&line);
        }
        metrics::record_iteration(self.kernel_time);

        self.iteration_number += 1;
        self.state = SessionState::IterationIdle;
        Ok(())
    }

    /// Send the terminal message and release the transport and local log.
    ///
    /// Ending an already ended or killed session returns
    /// [`SessionError::Inactive`] and does nothing.
    pub fn end(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Started | SessionState::IterationIdle => {}
            SessionState::IterationActive => {
                self.contract_violation("end called inside an active iteration")
            }
            state => return Err(SessionError::Inactive(state)),
        }
        let (message_type, marker) = if self.kernels_total_errors > 0 {
            (MessageType::SdcEnd, SDC_END_MARKER)
        } else {
            (MessageType::NormalEnd, NORMAL_END_MARKER)
        };
        self.send(Frame::text(message_type, marker));
        self.append_local(marker);
        self.release(SessionState::Ended);
        self.span.record_result(&Ok::<(), KillReason>(()));
        tracing::info!(
            parent: &self.span,
            iterations = self.iteration_number,
            total_errors = self.kernels_total_errors,
            kernel_time_acc = self.kernel_time_acc,
            "telemetry session ended"
        );
        Ok(())
    }

    // -- counts and details ------------------------------------------------

    /// Record the number of errors found by the current kernel execution.
    pub fn report_error_count(&mut self, kernel_errors: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        if kernel_errors == 0 {
            return Ok(());
        }
        self.kernels_total_errors += kernel_errors;
        let line = format!(
            "#SDC Ite:{} KerTime:{:.6} AccTime:{:.6} KerErr:{} AccErr:{}",
            self.iteration_number,
            self.kernel_time,
            self.kernel_time_acc,
            kernel_errors,
            self.kernels_total_errors
        );
        self.append_local(&line);
        tracing::warn!(parent: &self.span, iteration = self.iteration_number, kernel_errors, "errors reported");

        match self.policy.check_errors(kernel_errors, self.iteration_number) {
            Verdict::Continue => Ok(()),
            Verdict::Kill(reason) => Err(self.kill(reason)),
        }
    }

    /// Record the number of informational observations for the current kernel.
    pub fn report_info_count(&mut self, info_count: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        if info_count == 0 {
            return Ok(());
        }
        self.kernels_total_infos += info_count;
        let line = format!(
            "#CINF Ite:{} KerTime:{:.6} AccTime:{:.6} KerInfo:{} AccInfo:{}",
            self.iteration_number,
            self.kernel_time,
            self.kernel_time_acc,
            info_count,
            self.kernels_total_infos
        );
        self.append_local(&line);

        match self.policy.check_infos(info_count) {
            Verdict::Continue => {
                if info_count > self.policy.max_infos_per_iter() {
                    tracing::warn!(
                        parent: &self.span,
                        info_count,
                        max = self.policy.max_infos_per_iter(),
                        "info count over cap, overflow is not fatal"
                    );
                }
                Ok(())
            }
            Verdict::Kill(reason) => Err(self.kill(reason)),
        }
    }

    /// Emit one error detail line unless this iteration's budget is spent.
    pub fn report_error_detail(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        match self.policy.error_detail(self.log_error_detail_counter) {
            DetailVerdict::Emit => {
                self.log_error_detail_counter += 1;
                let line = format!("#ERR {}", text);
                self.send(Frame::text(MessageType::ErrorDetail, &line));
                self.append_local(&line);
            }
            DetailVerdict::Drop => {
                self.dropped_details += 1;
                metrics::record_detail_dropped("error");
            }
        }
        Ok(())
    }

    /// Emit one info detail line unless this iteration's budget is spent.
    pub fn report_info_detail(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        match self.policy.info_detail(self.log_info_detail_counter) {
            DetailVerdict::Emit => {
                self.log_info_detail_counter += 1;
                let line = format!("#INF {}", text);
                self.send(Frame::text(MessageType::InfoDetail, &line));
                self.append_local(&line);
            }
            DetailVerdict::Drop => {
                self.dropped_details += 1;
                metrics::record_detail_dropped("info");
            }
        }
        Ok(())
    }

    // -- settings ----------------------------------------------------------

    pub fn set_max_errors_per_iteration(&mut self, max: usize) {
        self.policy.set_max_errors_per_iter(max);
    }

    pub fn set_max_infos_per_iteration(&mut self, max: usize) {
        self.policy.set_max_infos_per_iter(max);
    }

    /// Emit timing every `interval` iterations. Zero is treated as one.
    pub fn set_print_interval(&mut self, interval: usize) {
        self.iter_interval_print = interval.max(1);
    }

    /// Stop killing on errors in consecutive iterations. Cannot be re-enabled.
    pub fn disable_double_error_kill(&mut self) {
        self.policy.disable_double_error_kill();
    }

    pub fn set_info_overflow_fatal(&mut self, fatal: bool) {
        self.policy.set_info_overflow_fatal(fatal);
    }

    // -- accessors ---------------------------------------------------------

    pub fn current_iteration(&self) -> usize {
        self.iteration_number
    }

    pub fn log_file_name(&self) -> &str {
        &self.log_file_name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn benchmark_name(&self) -> &str {
        &self.benchmark_name
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport_kind
    }

    /// Wall time of the last completed iteration, in seconds.
    pub fn kernel_time(&self) -> f64 {
        self.kernel_time
    }

    pub fn kernel_time_acc(&self) -> f64 {
        self.kernel_time_acc
    }

    pub fn total_errors(&self) -> usize {
        self.kernels_total_errors
    }

    pub fn total_infos(&self) -> usize {
        self.kernels_total_infos
    }

    pub fn max_errors_per_iteration(&self) -> usize {
        self.policy.max_errors_per_iter()
    }

    pub fn max_infos_per_iteration(&self) -> usize {
        self.policy.max_infos_per_iter()
    }

    pub fn print_interval(&self) -> usize {
        self.iter_interval_print
    }

    pub fn double_error_kill(&self) -> bool {
        self.policy.double_error_kill()
    }

    /// Out-of-order lifecycle calls seen so far.
    pub fn contract_violations(&self) -> usize {
        self.contract_violations
    }

    /// Detail messages dropped by the per-iteration cap.
    pub fn dropped_details(&self) -> usize {
        self.dropped_details
    }

    // -- internals ---------------------------------------------------------

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(SessionError::Inactive(self.state))
        }
    }

    fn contract_violation(&mut self, what: &'static str) {
        self.contract_violations += 1;
        tracing::warn!(
            parent: &self.span,
            iteration = self.iteration_number,
            state = %self.state,
            "{}",
            what
        );
    }

    /// Best-effort send. Failures are reported and otherwise ignored.
    fn send(&mut self, frame: Frame) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let span = &self.span;
        let message_type = frame.message_type();
        if frame.is_truncated() {
            tracing::debug!(
                parent: span,
                message_type = %message_type,
                kept = frame.payload().len(),
                "payload truncated to frame size"
            );
        }
        match transport.send(&frame) {
            Ok(_) => metrics::record_message_sent(message_type),
            Err(e) => {
                metrics::record_send_failure(message_type);
                eprintln!("{}: {}", self.benchmark_name, e);
                tracing::warn!(parent: span, error = %e, "telemetry send failed");
            }
        }
    }

    fn append_local(&mut self, line: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.append(line);
        }
    }

    /// Release the transport and local log exactly once.
    fn release(&mut self, final_state: SessionState) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        if let Some(mut sink) = self.sink.take() {
            sink.flush();
        }
        self.state = final_state;
    }

    fn kill(&mut self, reason: KillReason) -> SessionError {
        let marker = reason.marker();
        eprintln!("{} ({}), log file: {}", marker, reason, self.log_file_name);
        self.send(Frame::text(reason.message_type(), marker));
        self.append_local(marker);
        self.release(SessionState::KilledFatal);
        self.span.record_result(&Err::<(), _>(reason));
        tracing::error!(parent: &self.span, %reason, "telemetry session killed");
        self.terminator.terminate(&reason);
        SessionError::ThresholdExceeded(reason)
    }
}

impl Drop for IterationSession {
    fn drop(&mut self) {
        if self.state.is_open() {
            let _ = self.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::transport::{RecordedFrames, RecordingTransport};

    fn session_with(options: impl FnOnce(SessionBuilder) -> SessionBuilder) -> (IterationSession, RecordedFrames) {
        let transport = RecordingTransport::new();
        let frames = transport.frames();
        let builder = IterationSession::builder("matmul", "n=1024")
            .config(ConfigStore::default())
            .transport(transport)
            .terminator(ReportOnly)
            .local_log(false);
        (options(builder).start().unwrap(), frames)
    }

    fn session() -> (IterationSession, RecordedFrames) {
        session_with(|b| b)
    }

    fn run_iteration(s: &mut IterationSession) {
        s.begin_iteration().unwrap();
        s.end_iteration().unwrap();
    }

    #[test]
    fn start_sends_header() {
        let (s, frames) = session();
        assert_eq!(s.state(), SessionState::Started);
        assert_eq!(frames.types(), vec![MessageType::CreateHeader]);
        let header = HeaderPayload::decode(frames.snapshot()[0].payload()).unwrap();
        assert_eq!(header.benchmark_name, "matmul");
        assert_eq!(header.test_info, "n=1024");
    }

    #[test]
    fn iteration_counter_and_accumulated_time() {
        let (mut s, _) = session();
        let mut sum = 0.0;
        for n in 1..=5 {
            run_iteration(&mut s);
            sum += s.kernel_time();
            assert_eq!(s.current_iteration(), n);
        }
        assert!((s.kernel_time_acc() - sum).abs() < 1e-9);
        assert_eq!(s.contract_violations(), 0);
    }

    #[test]
    fn timing_respects_interval() {
        let (mut s, frames) = session_with(|b| b.print_interval(3));
        for _ in 0..7 {
            run_iteration(&mut s);
        }
        // Iterations 0, 3 and 6 are printed.
        assert_eq!(frames.count(MessageType::IterationTime), 3);
        let timings: Vec<String> = frames
            .snapshot()
            .iter()
            .filter(|f| f.message_type() == MessageType::IterationTime)
            .map(|f| f.payload_lossy())
            .collect();
        assert!(timings[1].starts_with("#IT Ite:3 KerTime:"));
        assert_eq!(s.current_iteration(), 7);
    }

    #[test]
    fn zero_interval_means_every_iteration() {
        let (mut s, frames) = session();
        s.set_print_interval(0);
        assert_eq!(s.print_interval(), 1);
        run_iteration(&mut s);
        run_iteration(&mut s);
        assert_eq!(frames.count(MessageType::IterationTime), 2);
    }

    #[test]
    fn detail_cap_resets_each_iteration() {
        let (mut s, frames) = session_with(|b| b.max_errors_per_iteration(2));
        s.begin_iteration().unwrap();
        for i in 0..3 {
            s.report_error_detail(&format!("mismatch {}", i)).unwrap();
        }
        assert_eq!(frames.count(MessageType::ErrorDetail), 2);
        assert_eq!(s.dropped_details(), 1);
        s.end_iteration().unwrap();

        s.begin_iteration().unwrap();
        s.report_error_detail("mismatch again").unwrap();
        assert_eq!(frames.count(MessageType::ErrorDetail), 3);
        assert_eq!(frames.last().unwrap().payload_lossy(), "#ERR mismatch again");
    }

    #[test]
    fn info_details_use_info_cap() {
        let (mut s, frames) = session_with(|b| b.max_infos_per_iteration(1));
        s.begin_iteration().unwrap();
        s.report_info_detail("temp=71C").unwrap();
        s.report_info_detail("temp=72C").unwrap();
        assert_eq!(frames.count(MessageType::InfoDetail), 1);
    }

    #[test]
    fn error_count_at_cap_survives() {
        let (mut s, frames) = session_with(|b| b.max_errors_per_iteration(4));
        run_iteration(&mut s);
        s.report_error_count(4).unwrap();
        assert_eq!(s.state(), SessionState::IterationIdle);
        assert_eq!(s.total_errors(), 4);
        assert_eq!(frames.count(MessageType::TooManyErrorsPerIteration), 0);
    }

    #[test]
    fn error_overflow_kills() {
        let (mut s, frames) = session_with(|b| b.max_errors_per_iteration(4));
        run_iteration(&mut s);
        let err = s.report_error_count(5).unwrap_err();
        assert!(matches!(
            err,
            SessionError::ThresholdExceeded(KillReason::TooManyErrors { count: 5, max: 4 })
        ));
        assert_eq!(s.state(), SessionState::KilledFatal);
        assert_eq!(frames.last().unwrap().message_type(), MessageType::TooManyErrorsPerIteration);
        assert!(frames.is_closed());
    }

    #[test]
    fn info_overflow_kills_when_fatal() {
        let (mut s, frames) = session_with(|b| b.max_infos_per_iteration(2));
        assert!(s.report_info_count(3).is_err());
        assert_eq!(frames.last().unwrap().message_type(), MessageType::TooManyInfosPerIteration);
    }

    #[test]
    fn info_overflow_continues_when_not_fatal() {
        let (mut s, frames) = session_with(|b| b.max_infos_per_iteration(2).info_overflow_fatal(false));
        s.report_info_count(3).unwrap();
        assert_eq!(s.total_infos(), 3);
        assert_eq!(frames.count(MessageType::TooManyInfosPerIteration), 0);
        assert!(s.state().is_open());
    }

    #[test]
    fn consecutive_error_iterations_kill() {
        let (mut s, frames) = session();
        run_iteration(&mut s);
        s.report_error_count(1).unwrap();
        run_iteration(&mut s);
        let err = s.report_error_count(1).unwrap_err();
        assert!(matches!(
            err,
            SessionError::ThresholdExceeded(KillReason::ErrorsInConsecutiveIterations { .. })
        ));
        assert_eq!(frames.last().unwrap().message_type(), MessageType::SameErrorLastIteration);
    }

    #[test]
    fn disabled_double_kill_lets_run_continue() {
        let (mut s, frames) = session();
        s.disable_double_error_kill();
        for _ in 0..3 {
            run_iteration(&mut s);
            s.report_error_count(1).unwrap();
        }
        assert_eq!(s.total_errors(), 3);
        s.end().unwrap();
        assert_eq!(frames.last().unwrap().message_type(), MessageType::SdcEnd);
    }

    #[test]
    fn clean_run_ends_normally() {
        let (mut s, frames) = session();
        run_iteration(&mut s);
        s.end().unwrap();
        assert_eq!(s.state(), SessionState::Ended);
        let last = frames.last().unwrap();
        assert_eq!(last.message_type(), MessageType::NormalEnd);
        assert_eq!(last.payload(), NORMAL_END_MARKER.as_bytes());
        assert!(frames.is_closed());
    }

    #[test]
    fn nothing_is_sent_after_end() {
        let (mut s, frames) = session();
        s.end().unwrap();
        let sent = frames.len();
        assert!(matches!(s.end(), Err(SessionError::Inactive(SessionState::Ended))));
        assert!(s.begin_iteration().is_err());
        assert!(s.end_iteration().is_err());
        assert!(s.report_error_detail("late").is_err());
        assert!(s.report_error_count(1).is_err());
        assert_eq!(frames.len(), sent);
    }

    #[test]
    fn killed_session_rejects_calls() {
        let (mut s, frames) = session_with(|b| b.max_errors_per_iteration(0));
        assert!(s.report_error_count(1).is_err());
        let sent = frames.len();
        assert!(matches!(s.end(), Err(SessionError::Inactive(SessionState::KilledFatal))));
        assert!(s.report_info_detail("late").is_err());
        assert_eq!(frames.len(), sent);
    }

    #[test]
    fn out_of_order_calls_are_counted() {
        let (mut s, _) = session();
        s.end_iteration().unwrap();
        assert_eq!(s.contract_violations(), 1);
        assert_eq!(s.current_iteration(), 1);
        s.begin_iteration().unwrap();
        s.begin_iteration().unwrap();
        assert_eq!(s.contract_violations(), 2);
        s.end().unwrap();
        assert_eq!(s.contract_violations(), 3);
    }

    #[test]
    fn send_failures_do_not_change_state() {
        let (mut s, frames) = session();
        frames.set_fail_sends(true);
        run_iteration(&mut s);
        assert_eq!(s.current_iteration(), 1);
        assert_eq!(s.state(), SessionState::IterationIdle);
        frames.set_fail_sends(false);
        run_iteration(&mut s);
        assert_eq!(frames.count(MessageType::IterationTime), 1);
    }

    #[test]
    fn drop_ends_open_session() {
        let (s, frames) = session();
        drop(s);
        assert_eq!(frames.last().unwrap().message_type(), MessageType::NormalEnd);
        assert!(frames.is_closed());
    }

    #[test]
    fn long_detail_is_cut_on_a_char_boundary() {
        let (mut s, frames) = session();
        s.begin_iteration().unwrap();
        // "#ERR " plus 1017 ASCII bytes leaves 'é' straddling the payload limit.
        let text = format!("{}é", "a".repeat(1017));
        s.report_error_detail(&text).unwrap();

        let frame = frames.last().unwrap();
        assert_eq!(frame.message_type(), MessageType::ErrorDetail);
        assert!(frame.is_truncated());
        assert_eq!(frame.payload().len(), 1022);
        let wire = std::str::from_utf8(frame.payload()).unwrap();
        assert!(wire.starts_with("#ERR aaa"));
        assert!(wire.ends_with('a'));
    }

    #[test]
    fn long_info_detail_stays_utf8_on_the_wire() {
        let (mut s, frames) = session();
        s.begin_iteration().unwrap();
        s.report_info_detail(&"é".repeat(600)).unwrap();
        let encoded = frames.last().unwrap().encode();
        let decoded = Frame::decode(&encoded).unwrap();
        assert!(std::str::from_utf8(decoded.payload()).is_ok());
    }

    #[test]
    fn name_length_boundary() {
        let ok = IterationSession::builder("a".repeat(255), "")
            .config(ConfigStore::default())
            .transport(RecordingTransport::new())
            .local_log(false)
            .start();
        assert!(ok.is_ok());

        let too_long = IterationSession::builder("a".repeat(256), "")
            .config(ConfigStore::default())
            .transport(RecordingTransport::new())
            .local_log(false)
            .start();
        assert!(matches!(
            too_long,
            Err(SessionError::Config(ConfigError::BenchmarkNameTooLong { len: 256 }))
        ));
    }
}
