use std::io::{BufRead, BufReader, Write};

use kvpaxos::{Request, Response, TcpTransport, Transport};
use structopt::StructOpt;

/// Entries written, read back and deleted by `demo`.
const DEMO: [(&str, &str); 5] = [
    ("Name", "Alice"),
    ("Age", "30"),
    ("City", "New York"),
    ("Course", "Distributed Systems"),
    ("Hobby", "Cycling"),
];

enum Command {
    /// Read a key from the server
    Get {
        key: String,
    },

    /// Write a key through consensus
    Put {
        key: String,
        value: String,
    },

    /// Delete a key through consensus
    Delete {
        key: String,
    },

    /// Run the scripted PUT/GET/DELETE sequence
    Demo,

    Help,

    Quit,
}

fn usage() {
    println!(
        "{}{}{}{}{}{}{}{}",
        "--------------------------------------------------------------\n",
        "Possible commands:\n",
        "get <KEY>           | g <KEY>          -- Read <KEY>\n",
        "put <KEY> <VALUE>   | p <KEY> <VALUE>  -- Write <KEY> = <VALUE>\n",
        "delete <KEY>        | d <KEY>          -- Delete <KEY>\n",
        "demo                                   -- 5 PUTs, 5 GETs, 5 DELETEs\n",
        "quit                | q                -- Exit\n",
        "--------------------------------------------------------------",
    );
}

impl std::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut iter = s.trim().splitn(3, ' ');
        let key = |iter: Option<&str>| iter.map(str::to_string).ok_or(());
        match iter.next() {
        | Some("help") | Some("h") => Ok(Command::Help),
        | Some("quit") | Some("q") => Ok(Command::Quit),
        | Some("demo") => Ok(Command::Demo),
        | Some("get") | Some("g") => key(iter.next()).map(|key| Command::Get { key }),
        | Some("delete") | Some("d") => key(iter.next()).map(|key| Command::Delete { key }),
        | Some("put") | Some("p") => {
            let key = key(iter.next())?;
            let value = iter.next().map(str::to_string).ok_or(())?;
            Ok(Command::Put { key, value })
        }
        | _ => Err(()),
        }
    }
}

struct Client {
    address: String,
    transport: TcpTransport,
}

impl Client {
    async fn get(&self, key: &str) {
        let request = Request::Get { key: key.to_string() };
        match self.transport.call(&self.address, request).await {
        | Ok(Response::Value(Some(value))) => println!("GET {}: {}", key, value),
        | Ok(Response::Value(None)) => println!("GET {}: Key not found", key),
        | Ok(other) => println!("[ERROR]: unexpected response {:?}", other),
        | Err(error) => println!("[ERROR]: GET {} failed: {}", key, error),
        }
    }

    async fn put(&self, key: &str, value: &str) {
        let request = Request::Put { key: key.to_string(), value: value.to_string() };
        match self.transport.call(&self.address, request).await {
        | Ok(Response::Written(written)) => println!("PUT {}: {} -> {}", key, value, outcome(written)),
        | Ok(other) => println!("[ERROR]: unexpected response {:?}", other),
        | Err(error) => println!("[ERROR]: PUT {} failed: {}", key, error),
        }
    }

    async fn delete(&self, key: &str) {
        let request = Request::Delete { key: key.to_string() };
        match self.transport.call(&self.address, request).await {
        | Ok(Response::Deleted(deleted)) => println!("DELETE {}: {}", key, outcome(deleted)),
        | Ok(other) => println!("[ERROR]: unexpected response {:?}", other),
        | Err(error) => println!("[ERROR]: DELETE {} failed: {}", key, error),
        }
    }

    async fn demo(&self) {
        println!("Performing 5 PUT operations...");
        for (key, value) in DEMO.iter() {
            self.put(key, value).await;
        }
        println!("\nPerforming 5 GET operations...");
        for (key, _) in DEMO.iter() {
            self.get(key).await;
        }
        println!("\nPerforming 5 DELETE operations...");
        for (key, _) in DEMO.iter() {
            self.delete(key).await;
        }
        println!("\nAll operations completed.");
    }
}

fn outcome(success: bool) -> &'static str {
    if success { "Succeeded" } else { "Failed" }
}

#[derive(StructOpt)]
#[structopt(name = "kvstore-client")]
struct Opt {
    /// Server host
    #[structopt(long = "host", env = "SERVER_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[structopt(short = "p", long = "port", env = "SERVER_PORT")]
    port: u16,

    /// Run the scripted sequence and exit
    #[structopt(long = "demo")]
    demo: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[structopt(short = "v", parse(from_occurrences))]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opt = Opt::from_args();

    if let Err(error) = kvstore::logger(opt.verbose) {
        eprintln!("[ERROR]: could not install logger: {}", error);
    }

    let client = Client {
        address: format!("{}:{}", opt.host, opt.port),
        transport: TcpTransport::new(),
    };

    if opt.demo {
        client.demo().await;
        return
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(stdin.lock())
        .lines()
        .filter_map(|line| line.ok());

    // Main interaction loop
    loop {
        print!("> ");
        stdout.flush().ok();

        let line = match lines.next() {
        | Some(line) => line,
        | None => return,
        };

        // Attempt to parse command from user input
        let command = match line.parse::<Command>() {
        | Ok(command) => command,
        | Err(()) => {
            println!("[ERROR]: could not parse command");
            continue
        }
        };

        match command {
        | Command::Get { key } => client.get(&key).await,
        | Command::Put { key, value } => client.put(&key, &value).await,
        | Command::Delete { key } => client.delete(&key).await,
        | Command::Demo => client.demo().await,
        | Command::Help => usage(),
        | Command::Quit => return,
        }
    }
}
