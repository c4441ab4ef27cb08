use agora_core::Error;

/// The node's four cluster-facing sockets (the reference-server REQ
/// socket lives in `agora-refclient`, used only for the infrequent
/// rank/list calls rather than the per-iteration poll loop).
///
/// Suspension happens only inside [`Sockets::poll`]: every other call in
/// the event loop is non-blocking, so the loop's cooperative scheduling
/// is entirely governed by the poll timeout.
pub struct Sockets {
    pub req_in: zmq::Socket,
    pub pub_out: zmq::Socket,
    pub sub_replication: zmq::Socket,
    pub sub_servers: zmq::Socket,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Readiness {
    pub req_in: bool,
    pub sub_replication: bool,
    pub sub_servers: bool,
}

impl Sockets {
    pub fn connect(
        ctx: &zmq::Context,
        broker_endpoint: &str,
        proxy_in_endpoint: &str,
        proxy_out_endpoint: &str,
        subscriptions_replication: &[&str],
        subscriptions_servers: &[&str],
    ) -> Result<Self, Error> {
        let req_in = ctx.socket(zmq::REP)?;
        req_in.connect(broker_endpoint)?;

        let pub_out = ctx.socket(zmq::PUB)?;
        pub_out.connect(proxy_in_endpoint)?;

        let sub_replication = ctx.socket(zmq::SUB)?;
        sub_replication.connect(proxy_out_endpoint)?;
        for topic in subscriptions_replication {
            sub_replication.set_subscribe(topic.as_bytes())?;
        }

        let sub_servers = ctx.socket(zmq::SUB)?;
        sub_servers.connect(proxy_out_endpoint)?;
        for topic in subscriptions_servers {
            sub_servers.set_subscribe(topic.as_bytes())?;
        }

        Ok(Self {
            req_in,
            pub_out,
            sub_replication,
            sub_servers,
        })
    }

    /// Block for up to `timeout_ms` waiting for any socket to become
    /// readable: a single `poll` call per loop iteration.
    pub fn poll(&self, timeout_ms: i64) -> Result<Readiness, Error> {
        let mut items = [
            self.req_in.as_poll_item(zmq::POLLIN),
            self.sub_replication.as_poll_item(zmq::POLLIN),
            self.sub_servers.as_poll_item(zmq::POLLIN),
        ];
        zmq::poll(&mut items, timeout_ms)?;
        Ok(Readiness {
            req_in: items[0].is_readable(),
            sub_replication: items[1].is_readable(),
            sub_servers: items[2].is_readable(),
        })
    }

    pub fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        self.pub_out.send(topic, zmq::SNDMORE)?;
        self.pub_out.send(payload, 0)?;
        Ok(())
    }

    pub fn recv_frame(socket: &zmq::Socket) -> Result<(String, Vec<u8>), Error> {
        let topic = socket.recv_string(0)?.map_err(|_| {
            Error::Codec("non-utf8 topic frame on pub/sub socket".to_string())
        })?;
        let payload = socket.recv_bytes(0)?;
        Ok((topic, payload))
    }
}
