use std::sync::Arc;

use tokio::net::TcpListener;

use kvpaxos::{serve, Config, Node, Request, Response, TcpTransport, Transport};

/// Starts `count` nodes on ephemeral ports and returns their addresses.
async fn cluster(count: usize) -> Vec<String> {
    let mut listeners = Vec::new();
    for _ in 0..count {
        listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    let addresses = listeners.iter()
        .map(|listener| listener.local_addr().unwrap().to_string())
        .collect::<Vec<_>>();
    for (id, listener) in listeners.into_iter().enumerate() {
        let config = Config::new(id as u64, addresses[id].clone(), addresses.clone());
        let node = Arc::new(Node::new(&config, TcpTransport::new()).unwrap());
        tokio::spawn(serve(listener, node));
    }
    addresses
}

async fn call(address: &str, request: Request) -> Response {
    TcpTransport::new().call(address, request).await.unwrap()
}

fn get(key: &str) -> Request {
    Request::Get { key: key.to_string() }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn replicates_over_tcp() {
    let nodes = cluster(3).await;

    let put = Request::Put { key: "name".to_string(), value: "Alice".to_string() };
    assert_eq!(call(&nodes[0], put).await, Response::Written(true));
    for node in &nodes {
        assert_eq!(call(node, get("name")).await, Response::Value(Some("Alice".to_string())));
    }

    let delete = Request::Delete { key: "name".to_string() };
    assert_eq!(call(&nodes[2], delete.clone()).await, Response::Deleted(true));
    assert_eq!(call(&nodes[1], get("name")).await, Response::Value(None));
    assert_eq!(call(&nodes[2], delete).await, Response::Deleted(false));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn commits_with_one_replica_down() {
    let mut nodes = cluster(2).await;

    // Reserve a port, then free it so nothing answers there. The
    // coordinator's own port is taken first so it cannot reuse it.
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    nodes.push(dead.local_addr().unwrap().to_string());
    drop(dead);

    // The two live nodes were configured as a pair; the coordinator also
    // lists the dead address and itself.
    let mut replicas = nodes.clone();
    replicas.push(address.clone());
    let config = Config::new(7, address.clone(), replicas);
    let node = Arc::new(Node::new(&config, TcpTransport::new()).unwrap());
    tokio::spawn(serve(listener, node));

    let put = Request::Put { key: "Hobby".to_string(), value: "Cycling".to_string() };
    assert_eq!(call(&address, put).await, Response::Written(true));
    assert_eq!(call(&nodes[0], get("Hobby")).await, Response::Value(Some("Cycling".to_string())));
}

#[tokio::test]
async fn unreachable_peer_is_a_transport_error() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = dead.local_addr().unwrap().to_string();
    drop(dead);
    let result = TcpTransport::new().call(&address, get("k")).await;
    assert!(matches!(result, Err(kvpaxos::Error::Transport { .. })));
}
