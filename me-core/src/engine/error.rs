/// Errors surfaced by `EngineContext::init`.
#[derive(Debug)]
pub enum InitError {
    /// `memory_budget < minimum(n_securities)` or `n_securities == 0`.
    Domain,
}

/// Errors surfaced by `ClientContext::send`/`receive`.
#[derive(Debug)]
pub enum TransportError {
    /// The peer end of the channel has been dropped.
    Closed,
    /// A record was received but could not be decoded.
    Malformed,
}
