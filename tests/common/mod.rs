//! Shared helpers for the integration tests
#![allow(dead_code)]

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};

use netprobe::speed::BodySource;
use netprobe::Result;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const MIB: usize = 1024 * 1024;

/// Serves the same in-memory payload for every URL
pub struct StaticSource {
    pub payload: Vec<u8>,
}

impl StaticSource {
    pub fn new(len: usize) -> Self {
        Self { payload: vec![0xAB; len] }
    }
}

impl BodySource for StaticSource {
    fn open(&self, _url: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.payload.clone())))
    }
}

/// A URL on localhost where nothing is listening
pub fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

/// A one-shot forward HTTP proxy on localhost.
///
/// Answers the first request with `body` and yields the request line it received.
pub fn spawn_http_proxy(body: &'static [u8]) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind proxy port");
    let proxy_url = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept proxied connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request line");
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).expect("read header") == 0 || header == "\r\n" {
                break;
            }
        }

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .expect("write response head");
        stream.write_all(body).expect("write response body");
        request_line.trim_end().to_string()
    });

    (proxy_url, handle)
}

/// Write a minimal EPUB whose chapters contain the given markup
pub fn write_epub(path: &Path, chapters: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).expect("create epub"));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0"?><container version="1.0"><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#,
    )
    .unwrap();

    zip.start_file("OEBPS/content.opf", deflated).unwrap();
    let opf = "<package><metadata><dc:title>繁體書名</dc:title></metadata></package>";
    zip.write_all(opf.as_bytes()).unwrap();

    zip.start_file("OEBPS/images/cover.png", stored).unwrap();
    zip.write_all(&[0x89, b'P', b'N', b'G', 0x00, 0xFF, 0x10]).unwrap();

    for (name, body) in chapters {
        zip.start_file(format!("OEBPS/{}", name), deflated).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
}

/// Read one entry of a zip archive as bytes
pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).unwrap();
    buf
}
