use super::use_notices;
use crate::api::{admin_logout, verify_admin_session};
use crate::auth::{current_session, sign_out};
use crate::storage::BrowserStore;
use crate::types::SessionMarker;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

/// Landing page after a granted login. The stored marker is re-checked
/// against the server before anything is shown.
#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let notices = use_notices();
    let navigate = use_navigate();
    let session = RwSignal::new(None::<SessionMarker>);

    Effect::new({
        let navigate = navigate.clone();
        move |_| {
            let Some(marker) = current_session(&BrowserStore) else {
                navigate("/admin/login", Default::default());
                return;
            };
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                match verify_admin_session(marker.token.clone()).await {
                    Ok(true) => session.set(Some(marker)),
                    Ok(false) => {
                        sign_out(&BrowserStore);
                        notices.error("Session expired, please sign in again");
                        navigate("/admin/login", Default::default());
                    }
                    Err(e) => notices.error(format!("Could not verify session: {e}")),
                }
            });
        }
    });

    let handle_sign_out = move |_: leptos::ev::MouseEvent| {
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            let revoked = match sign_out(&BrowserStore) {
                Some(marker) => admin_logout(marker.token).await,
                None => Ok(()),
            };
            if let Err(e) = revoked {
                tracing::warn!("Server logout failed: {}", e);
            }
            notices.success("Signed out");
            navigate("/admin/login", Default::default());
        });
    };

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-2xl font-bold text-surface-900">"Admin Dashboard"</h1>
                    <p class="mt-1 text-sm text-surface-500">
                        {move || {
                            session
                                .get()
                                .map(|m| format!("Signed in as {} ({})", m.name, m.email))
                                .unwrap_or_else(|| "Checking session...".to_string())
                        }}
                    </p>
                </div>
                <button type="button" class="btn-secondary" on:click=handle_sign_out>
                    "Sign out"
                </button>
            </div>
        </div>
    }
}
