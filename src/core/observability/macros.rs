/// Creates a root span based on the provided sampling rate. Using the
/// instrument attribute would still collect and clone context for every
/// refresh tick, this makes span sampling a pre-filter instead.
///
/// # Arguments
/// * `sample_percent` - The percent (0.0 to 1.0) of spans to sample
/// * `span_name` - The name of the span if created (must be a literal)
///
/// # Behavior
/// - If a parent span exists (is active): ALWAYS creates a child span
/// - If no parent exists: Makes sampling decision at the configured rate
///
/// # Example
/// ```ignore
/// let span = sample_or_attach_root_span!(0.01, "refresh_tick");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! sample_or_attach_root_span {
    ($sample_percent:expr, $span_name:literal) => {{
        let current = ::tracing::Span::current();

        if !current.is_disabled() || ::rand::random::<f32>() < $sample_percent {
            ::tracing::info_span!($span_name)
        } else {
            ::tracing::Span::none()
        }
    }};
}

/// Creates an INFO-level child span only if the parent span is active (sampled).
///
/// When the parent span is disabled this returns `Span::none()` without any overhead.
///
/// # Returns
/// An **un-entered** `Span` - you must call `.entered()` or use `.instrument()`.
///
/// # Examples
/// ```ignore
/// let span = child_span_info!("select_network_task", slot = %slot_id);
/// let _enter = span.entered();
/// ```
#[macro_export]
macro_rules! child_span_info {
    ($span_name:literal) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::info_span!($span_name)
        } else {
            ::tracing::Span::none()
        }
    }};
    ($span_name:literal, $($fields:tt)*) => {{
        if !::tracing::Span::current().is_disabled() {
            ::tracing::info_span!($span_name, $($fields)*)
        } else {
            ::tracing::Span::none()
        }
    }};
}
