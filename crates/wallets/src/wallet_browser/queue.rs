use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

use crate::wallet_browser::types::BrowserTransaction;

/// Something that can be matched with its response.
pub(crate) trait Identified {
    fn id(&self) -> Uuid;
}

impl Identified for BrowserTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Requests waiting to be picked up by the browser, in submission order, and the responses the
/// browser posted back, keyed by request id.
#[derive(Debug)]
pub(crate) struct RequestQueue<Req, Resp> {
    requests: VecDeque<Req>,
    responses: HashMap<Uuid, Resp>,
}

impl<Req, Resp> Default for RequestQueue<Req, Resp> {
    fn default() -> Self {
        Self { requests: VecDeque::new(), responses: HashMap::new() }
    }
}

impl<Req: Identified, Resp> RequestQueue<Req, Resp> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request(&mut self, request: Req) {
        self.requests.push_back(request);
    }

    pub fn has_request(&self, id: &Uuid) -> bool {
        self.requests.iter().any(|req| req.id() == *id)
    }

    /// The oldest pending request, left in the queue until answered.
    pub fn read_request(&self) -> Option<&Req> {
        self.requests.front()
    }

    pub fn remove_request(&mut self, id: &Uuid) {
        self.requests.retain(|req| req.id() != *id);
    }

    pub fn add_response(&mut self, id: Uuid, response: Resp) {
        self.responses.insert(id, response);
    }

    /// Takes the response for `id` out of the queue.
    pub fn get_response(&mut self, id: &Uuid) -> Option<Resp> {
        self.responses.remove(id)
    }
}
