//! Utility macros for reducing boilerplate

/// Implement `FromRef<AppState>` so a field of the shared state can be
/// extracted directly in handlers.
///
/// # Example
/// ```ignore
/// impl_from_ref!(Arc<VotesService>, service);
/// // Expands to:
/// impl axum::extract::FromRef<AppState> for Arc<VotesService> {
///     fn from_ref(state: &AppState) -> Self {
///         state.service.clone()
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}
