use serde::{Deserialize, Serialize};

/// `{"data": ...}` wrapper both sides agree on for request bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Serialize `body`, wrapped in an [`Envelope`] when `wrap` is set.
pub fn encode_body<T>(body: &T, wrap: bool) -> serde_json::Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    if wrap {
        serde_json::to_vec(&Envelope::new(body))
    } else {
        serde_json::to_vec(body)
    }
}
