use driverftpd::{Config, SampleDriver, Server, ServerContext};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

struct TestServer {
    addr: SocketAddr,
    context: Arc<ServerContext>,
    driver: Arc<SampleDriver>,
    root: TempDir,
}

impl TestServer {
    /// Starts a server with the sample driver on an ephemeral control port.
    /// `alice` / `secret` is the only account.
    async fn start(data_port_start: u16) -> Self {
        Self::start_with_limit(data_port_start, 50).await
    }

    async fn start_with_limit(data_port_start: u16, max_connections: u32) -> Self {
        let root = tempfile::tempdir().unwrap();
        let public_directory = root.path().to_str().unwrap().to_string();

        let passwd = root.path().join(".passwd");
        let hashed = bcrypt::hash("secret", 4).unwrap();
        std::fs::write(&passwd, format!("alice:{}\n", hashed)).unwrap();

        let toml = format!(
            r#"
[server]
listen_port = 0
public_ip = "203.0.113.5"
public_directory = "{dir}"
data_port_start = {start}
data_port_end = {end}
max_connections = {max_connections}
passwd_file = "{passwd}"

[access]
all = ["{dir}/"]
"#,
            dir = public_directory,
            start = data_port_start,
            end = data_port_start + 9,
            max_connections = max_connections,
            passwd = passwd.display(),
        );
        let config = Config::from_toml(&toml).unwrap();
        let driver = Arc::new(SampleDriver::new(config).await.unwrap());

        let server = Server::new(Arc::clone(&driver) as Arc<dyn driverftpd::ServerDriver>)
            .await
            .unwrap();
        let port = server.local_addr().unwrap().port();
        let context = server.context();
        tokio::spawn(server.run());

        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], port)),
            context,
            driver,
            root,
        }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join(name)
    }
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(server: &TestServer) -> Self {
        let stream = TcpStream::connect(server.addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
        };
        assert_eq!(client.reply().await, "220 Welcome");
        client
    }

    async fn login(server: &TestServer) -> Self {
        let mut client = Self::connect(server).await;
        assert!(client.command("USER alice").await.starts_with("331 "));
        assert!(client.command("PASS secret").await.starts_with("230 "));
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn reply(&mut self) -> String {
        let mut line = String::new();
        tokio::time::timeout(Duration::from_secs(15), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a reply")
            .unwrap();
        line.trim_end().to_string()
    }

    async fn command(&mut self, line: &str) -> String {
        self.send(line).await;
        self.reply().await
    }

    /// Issues PASV and connects to the advertised port.
    async fn passive_data(&mut self) -> TcpStream {
        let reply = self.command("PASV").await;
        assert!(reply.starts_with("227 "), "{}", reply);
        TcpStream::connect(("127.0.0.1", pasv_port(&reply)))
            .await
            .unwrap()
    }
}

fn pasv_port(reply: &str) -> u16 {
    let start = reply.find('(').unwrap() + 1;
    let end = reply.find(')').unwrap();
    let fields: Vec<u16> = reply[start..end]
        .split(',')
        .map(|f| f.trim().parse().unwrap())
        .collect();
    fields[4] * 256 + fields[5]
}

#[tokio::test]
async fn commands_require_login() {
    let server = TestServer::start(42000).await;
    let mut client = Client::connect(&server).await;

    assert_eq!(client.command("PWD").await, "530 Not logged in.");
    assert_eq!(client.command("PASV").await, "530 Not logged in.");
    assert!(client.command("PASS secret").await.starts_with("503 "));

    assert!(client.command("USER alice").await.starts_with("331 "));
    assert_eq!(client.command("PASS wrong").await, "530 Not logged in.");
    assert_eq!(client.command("PWD").await, "530 Not logged in.");

    assert!(client.command("USER alice").await.starts_with("331 "));
    assert!(client.command("PASS secret").await.starts_with("230 "));
    assert_eq!(
        client.command("PWD").await,
        format!("257 \"{}\" is the current directory.", server.root.path().display())
    );
    assert_eq!(
        server.context.port_pool.available().await,
        server.context.port_pool.capacity()
    );
}

#[tokio::test]
async fn passive_retrieve_store_and_list() {
    let server = TestServer::start(42020).await;
    std::fs::write(server.path("hello.txt"), b"hello over ftp\n").unwrap();
    let mut client = Client::login(&server).await;

    let mut data = client.passive_data().await;
    assert!(client.command("RETR hello.txt").await.starts_with("125 "));
    let mut received = Vec::new();
    data.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, b"hello over ftp\n");
    assert!(client.reply().await.starts_with("226 "));

    let mut data = client.passive_data().await;
    assert!(client.command("STOR upload.bin").await.starts_with("125 "));
    data.write_all(&[1, 2, 3, 4, 5]).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert!(client.reply().await.starts_with("226 "));
    assert_eq!(std::fs::read(server.path("upload.bin")).unwrap(), vec![1, 2, 3, 4, 5]);

    let mut data = client.passive_data().await;
    assert!(client.command("LIST").await.starts_with("125 "));
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert!(listing.contains("hello.txt"));
    assert!(listing.contains("upload.bin"));
    assert!(listing.ends_with("\r\n"));
    assert!(client.reply().await.starts_with("226 "));

    assert_eq!(client.command("SIZE upload.bin").await, "213 5");
}

#[tokio::test]
async fn quit_waits_for_running_transfer() {
    let server = TestServer::start(42040).await;
    let payload = vec![0x5a; 32 * 1024 * 1024];
    std::fs::write(server.path("big.bin"), &payload).unwrap();
    let mut client = Client::login(&server).await;
    assert_eq!(server.driver.connected_clients(), 1);

    let mut data = client.passive_data().await;
    assert!(client.command("RETR big.bin").await.starts_with("125 "));

    // The transfer is stuck on the unread data connection.
    client.send("QUIT").await;
    assert_eq!(
        client.command("NOOP").await,
        "421 Service not available, closing control connection."
    );

    let mut received = Vec::new();
    data.read_to_end(&mut received).await.unwrap();
    assert_eq!(received.len(), payload.len());

    assert!(client.reply().await.starts_with("226 "));
    assert!(client.reply().await.starts_with("221 "));
    assert_eq!(server.driver.connected_clients(), 0);

    let mut rest = String::new();
    client.reader.read_to_string(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn port_replaces_passive_listener() {
    let server = TestServer::start(42060).await;
    std::fs::write(server.path("hello.txt"), b"active mode").unwrap();
    let mut client = Client::login(&server).await;

    let reply = client.command("PASV").await;
    let passive_port = pasv_port(&reply);
    assert_eq!(
        server.context.port_pool.available().await,
        server.context.port_pool.capacity() - 1
    );

    let active = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = active.local_addr().unwrap().port();
    let port_arg = format!("PORT 127,0,0,1,{},{}", port / 256, port % 256);
    assert_eq!(client.command(&port_arg).await, "200 Command okay.");

    assert_eq!(
        server.context.port_pool.available().await,
        server.context.port_pool.capacity()
    );
    assert!(TcpStream::connect(("127.0.0.1", passive_port)).await.is_err());

    client.send("RETR hello.txt").await;
    let (mut data, _) = active.accept().await.unwrap();
    assert!(client.reply().await.starts_with("150 "));
    let mut received = String::new();
    data.read_to_string(&mut received).await.unwrap();
    assert_eq!(received, "active mode");
    assert!(client.reply().await.starts_with("226 "));
}

#[tokio::test]
async fn disconnect_releases_passive_port_without_bye() {
    let server = TestServer::start(42080).await;
    let mut client = Client::login(&server).await;
    client.passive_data().await;
    drop(client);

    let pool = &server.context.port_pool;
    for _ in 0..50 {
        if pool.available().await == pool.capacity() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(pool.available().await, pool.capacity());
    assert_eq!(server.driver.connected_clients(), 1);
}

#[tokio::test]
async fn refused_welcome_closes_connection() {
    let server = TestServer::start_with_limit(42100, 0).await;
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut reader = BufReader::new(stream);

    let mut greeting = String::new();
    reader.read_line(&mut greeting).await.unwrap();
    assert_eq!(greeting.trim_end(), "500 Syntax error, command unrecognized.");

    let mut rest = String::new();
    reader.read_to_string(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert_eq!(server.driver.connected_clients(), 0);
}

#[tokio::test]
async fn stor_truncates_longer_file() {
    let server = TestServer::start(42120).await;
    std::fs::write(server.path("report.txt"), vec![b'x'; 100]).unwrap();
    let mut client = Client::login(&server).await;

    let mut data = client.passive_data().await;
    assert!(client.command("STOR report.txt").await.starts_with("125 "));
    data.write_all(b"new").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert!(client.reply().await.starts_with("226 "));

    assert_eq!(std::fs::read(server.path("report.txt")).unwrap(), b"new");
}
