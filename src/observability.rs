use biometrics::{Collector, Counter, Moments};

pub(crate) static TRANSPORT_REQUESTS: Counter = Counter::new("gkchat.transport.requests");
pub(crate) static TRANSPORT_ERRORS: Counter = Counter::new("gkchat.transport.errors");
pub(crate) static TRANSPORT_FETCH: Counter = Counter::new("gkchat.transport.fetch");
pub(crate) static TRANSPORT_NATIVE: Counter = Counter::new("gkchat.transport.native");
pub(crate) static TRANSPORT_DURATION: Moments =
    Moments::new("gkchat.transport.request_duration_seconds");

pub(crate) static CONVERSATION_EXCHANGES: Counter =
    Counter::new("gkchat.conversation.exchanges");
pub(crate) static CONVERSATION_FAILURES: Counter = Counter::new("gkchat.conversation.failures");
pub(crate) static CONVERSATION_REJECTED: Counter = Counter::new("gkchat.conversation.rejected");

pub(crate) static SESSION_ARCHIVED: Counter = Counter::new("gkchat.session.archived");
pub(crate) static SESSION_DELETED: Counter = Counter::new("gkchat.session.deleted");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&TRANSPORT_REQUESTS);
    collector.register_counter(&TRANSPORT_ERRORS);
    collector.register_counter(&TRANSPORT_FETCH);
    collector.register_counter(&TRANSPORT_NATIVE);
    collector.register_moments(&TRANSPORT_DURATION);

    collector.register_counter(&CONVERSATION_EXCHANGES);
    collector.register_counter(&CONVERSATION_FAILURES);
    collector.register_counter(&CONVERSATION_REJECTED);

    collector.register_counter(&SESSION_ARCHIVED);
    collector.register_counter(&SESSION_DELETED);
}
