//! End-to-end session tests over a loopback UDP collector.

use std::net::UdpSocket;
use std::path::Path;
use std::time::Duration;

use radbench_log::transport::{Frame, HeaderPayload, FRAME_SIZE};
use radbench_log::{
    ConfigError, IterationSession, MessageType, ReportOnly, SessionError, SessionState, TransportKind,
};

struct Collector {
    socket: UdpSocket,
}

impl Collector {
    fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        Self { socket }
    }

    fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    fn recv(&self) -> (usize, Frame) {
        let mut buf = [0u8; 4096];
        let (n, _) = self.socket.recv_from(&mut buf).unwrap();
        (n, Frame::decode(&buf[..n]).unwrap())
    }
}

fn write_config(dir: &Path, port: u16) -> std::path::PathBuf {
    let path = dir.join("radiation-benchmarks.conf");
    let text = format!(
        "# test machine\nserver_ip = 127.0.0.1\nport = {}\nvardir = {}\necc = ON\n",
        port,
        dir.display()
    );
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn header_timing_and_end_reach_collector() {
    let collector = Collector::bind();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), collector.port());

    let mut session = IterationSession::builder("matmul", "n=1024")
        .config_path(&config)
        .terminator(ReportOnly)
        .start()
        .unwrap();
    assert_eq!(session.transport_kind(), TransportKind::Datagram);

    let (n, header) = collector.recv();
    assert_eq!(n, FRAME_SIZE);
    assert_eq!(header.message_type(), MessageType::CreateHeader);
    let decoded = HeaderPayload::decode(header.payload()).unwrap();
    assert_eq!(header.payload()[0], 6);
    assert_eq!(decoded.benchmark_name, "matmul");
    assert_eq!(decoded.test_info, "n=1024");

    session.begin_iteration().unwrap();
    session.end_iteration().unwrap();
    let (_, timing) = collector.recv();
    assert_eq!(timing.message_type(), MessageType::IterationTime);
    assert!(timing.payload_lossy().starts_with("#IT Ite:0 KerTime:"));

    session.end().unwrap();
    let (_, end) = collector.recv();
    assert_eq!(end.message_type(), MessageType::NormalEnd);
    assert_eq!(session.state(), SessionState::Ended);
}

#[test]
fn local_log_mirrors_telemetry() {
    let collector = Collector::bind();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), collector.port());

    let mut session = IterationSession::builder("lava", "size:16")
        .config_path(&config)
        .terminator(ReportOnly)
        .start()
        .unwrap();
    let log_path = session.log_file_name().to_string();
    assert!(log_path.starts_with(&dir.path().join("log").display().to_string()));
    assert!(log_path.contains("_lava_ECC_ON_"));

    session.disable_double_error_kill();
    session.begin_iteration().unwrap();
    session.report_error_detail("p[3]: e=1.0 r=1.5").unwrap();
    session.end_iteration().unwrap();
    session.report_error_count(1).unwrap();
    session.end().unwrap();

    let text = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "#HEADER size:16");
    assert!(lines[1].starts_with("#BEGIN Y:"));
    assert_eq!(lines[2], "#ERR p[3]: e=1.0 r=1.5");
    assert!(lines[3].starts_with("#IT Ite:0"));
    assert!(lines[4].starts_with("#SDC Ite:1"));
    assert!(lines[4].ends_with("KerErr:1 AccErr:1"));
    assert_eq!(lines[5], "#END #SDC");
}

#[test]
fn unreachable_collector_does_not_stop_the_run() {
    // Bind and drop so nothing listens on the port.
    let port = UdpSocket::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), port);

    let mut session = IterationSession::builder("fft", "")
        .config_path(&config)
        .terminator(ReportOnly)
        .start()
        .unwrap();
    for _ in 0..20 {
        session.begin_iteration().unwrap();
        session.end_iteration().unwrap();
    }
    assert_eq!(session.current_iteration(), 20);
    session.end().unwrap();
}

#[test]
fn missing_port_fails_session_creation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radiation-benchmarks.conf");
    std::fs::write(&path, "server_ip=127.0.0.1\n").unwrap();

    let result = IterationSession::builder("fft", "")
        .config_path(&path)
        .start();
    assert!(matches!(
        result,
        Err(SessionError::Config(ConfigError::MissingKey(key))) if key == "port"
    ));
}
