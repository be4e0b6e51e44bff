use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use kvpaxos::{Config, Error, Node, Phase, ProposalNumber, Request, Response, Result, Transport};

/// How a scripted peer answers.
#[derive(Copy, Clone, Debug)]
enum Peer {
    Ack,
    Reject,
    PromiseOnly,
    Unreachable,
    Hung,
}

/// Records every call and answers according to a fixed script per peer.
#[derive(Clone)]
struct Recording {
    peers: Arc<Vec<(String, Peer)>>,
    calls: Arc<Mutex<Vec<(String, Request)>>>,
}

impl Recording {
    fn new(peers: Vec<(&str, Peer)>) -> Self {
        Recording {
            peers: Arc::new(peers.into_iter().map(|(name, peer)| (name.to_string(), peer)).collect()),
            calls: Arc::default(),
        }
    }

    fn replicas(&self) -> Vec<String> {
        std::iter::once("self".to_string())
            .chain(self.peers.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    fn numbers(&self, peer: &str, phase: Phase) -> Vec<ProposalNumber> {
        self.calls.lock()
            .iter()
            .filter(|(to, _)| to == peer)
            .filter_map(|(_, request)| match (phase, request) {
            | (Phase::Prepare, Request::Prepare { number, .. }) => Some(*number),
            | (Phase::Accept, Request::Accept { number, .. }) => Some(*number),
            | _ => None,
            })
            .collect()
    }

    fn learns(&self) -> usize {
        self.calls.lock()
            .iter()
            .filter(|(_, request)| matches!(request, Request::Learn { .. }))
            .count()
    }
}

#[async_trait]
impl Transport for Recording {
    async fn call(&self, peer: &str, request: Request) -> Result<Response> {
        self.calls.lock().push((peer.to_string(), request.clone()));
        let behavior = self.peers.iter()
            .find(|(name, _)| name == peer)
            .map(|(_, peer)| *peer)
            .unwrap_or(Peer::Unreachable);
        match (behavior, request) {
        | (Peer::Unreachable, _) => Err(Error::Transport {
            peer: peer.to_string(),
            reason: "refused".to_string(),
        }),
        | (Peer::Hung, _) => futures::future::pending().await,
        | (_, Request::Learn { .. }) => Ok(Response::Learned),
        | (Peer::Ack, Request::Prepare { .. }) => Ok(Response::Promise(true)),
        | (Peer::Ack, Request::Accept { .. }) => Ok(Response::Accepted(true)),
        | (Peer::PromiseOnly, Request::Prepare { .. }) => Ok(Response::Promise(true)),
        | (Peer::PromiseOnly, Request::Accept { .. }) => Ok(Response::Accepted(false)),
        | (Peer::Reject, Request::Prepare { .. }) => Ok(Response::Promise(false)),
        | (Peer::Reject, Request::Accept { .. }) => Ok(Response::Accepted(false)),
        | (_, other) => panic!("unexpected {:?}", other),
        }
    }
}

fn node(transport: &Recording) -> Node<Recording> {
    let config = Config::new(3, "self", transport.replicas())
        .with_timeout(Duration::from_millis(50));
    Node::new(&config, transport.clone()).unwrap()
}

fn strictly_increasing(numbers: &[ProposalNumber]) -> bool {
    numbers.windows(2).all(|pair| pair[0] < pair[1])
}

#[tokio::test]
async fn stops_at_first_success() {
    let transport = Recording::new(vec![("a", Peer::Ack), ("b", Peer::Ack)]);
    let number = node(&transport).put("name", "Alice").await.unwrap();
    assert_eq!(transport.numbers("a", Phase::Prepare), vec![number]);
    assert_eq!(transport.numbers("b", Phase::Accept), vec![number]);
    assert_eq!(transport.learns(), 2);
}

#[tokio::test]
async fn gives_up_after_five_increasing_numbers() {
    let transport = Recording::new(vec![("a", Peer::Reject), ("b", Peer::Reject)]);
    let node = node(&transport);
    let result = node.put("name", "Alice").await;
    assert!(matches!(result, Err(Error::RetryExhausted { attempts: 5 })));

    let numbers = transport.numbers("a", Phase::Prepare);
    assert_eq!(numbers.len(), 5);
    assert!(strictly_increasing(&numbers));
    assert!(numbers.iter().all(|number| number.0 % 1000 == 3));
    assert!(transport.numbers("a", Phase::Accept).is_empty());
    assert_eq!(transport.learns(), 0);
    assert_eq!(node.get("name"), None);
}

#[tokio::test]
async fn numbers_keep_increasing_across_writes() {
    let transport = Recording::new(vec![("a", Peer::Reject), ("b", Peer::Reject)]);
    let node = node(&transport);
    assert!(node.put("x", "1").await.is_err());
    assert!(node.put("y", "2").await.is_err());
    let numbers = transport.numbers("b", Phase::Prepare);
    assert_eq!(numbers.len(), 10);
    assert!(strictly_increasing(&numbers));
}

#[tokio::test]
async fn accept_quorum_is_required_separately() {
    let transport = Recording::new(vec![("a", Peer::PromiseOnly), ("b", Peer::PromiseOnly)]);
    let node = node(&transport);
    assert!(node.put("k", "v").await.is_err());
    assert_eq!(transport.numbers("a", Phase::Prepare).len(), 5);
    assert_eq!(transport.numbers("a", Phase::Accept).len(), 5);
    assert_eq!(transport.learns(), 0);
}

#[tokio::test]
async fn unreachable_peers_count_as_rejections() {
    let transport = Recording::new(vec![("a", Peer::Unreachable), ("b", Peer::Ack)]);
    let node = node(&transport);
    node.put("k", "v").await.unwrap();
    assert_eq!(node.get("k"), Some("v".to_string()));
}

#[tokio::test]
async fn hung_peer_times_out() {
    let transport = Recording::new(vec![("a", Peer::Hung), ("b", Peer::Ack)]);
    let node = node(&transport);
    let result = tokio::time::timeout(Duration::from_secs(5), node.put("k", "v")).await;
    assert!(result.expect("round did not time out").is_ok());
}

#[tokio::test]
async fn quorum_is_a_strict_majority_of_configured_replicas() {
    // Five replicas: self and two acking peers make three.
    let five = Recording::new(vec![
        ("a", Peer::Ack),
        ("b", Peer::Ack),
        ("c", Peer::Reject),
        ("d", Peer::Unreachable),
    ]);
    assert!(node(&five).put("k", "v").await.is_ok());

    // Four replicas: self and one acking peer make only two.
    let four = Recording::new(vec![("a", Peer::Ack), ("b", Peer::Reject), ("c", Peer::Reject)]);
    assert!(node(&four).put("k", "v").await.is_err());
}

#[tokio::test]
async fn coordinator_outside_replica_set_still_applies() {
    let transport = Recording::new(vec![("a", Peer::Ack), ("b", Peer::Ack), ("c", Peer::Reject)]);
    let replicas = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let config = Config::new(9, "self", replicas);
    let node = Node::new(&config, transport.clone()).unwrap();
    node.put("k", "v").await.unwrap();
    assert_eq!(node.get("k"), Some("v".to_string()));
    assert_eq!(transport.learns(), 3);
    assert_eq!(node.acceptor().highest_promised, ProposalNumber::default());
}
