// NOTE: every arm expands to nothing unless the `debug_trace` feature is enabled, so the traced
// expressions must be free of side effects.
macro_rules! trace {
    ( @step $input:expr, $step:expr ) => {
        #[cfg(feature = "debug_trace")]
        log::trace!(
            "@step {:?} -> {:?} (consumed: {}, blocked: {})",
            $input,
            $step.context().state(),
            $step.consumed(),
            $step.is_blocked()
        );
    };

    ( @blocked $bytes:expr ) => {
        #[cfg(feature = "debug_trace")]
        log::trace!("@blocked {:?}", $bytes);
    };

    ( @write $kind:literal, $text:expr ) => {
        #[cfg(feature = "debug_trace")]
        log::trace!("@write {} {:?}", $kind, $text);
    };

    ( @pipeline $context:expr, $pipeline:expr ) => {
        #[cfg(feature = "debug_trace")]
        log::trace!("@pipeline {:?} in {:?}", $pipeline, $context);
    };
}
