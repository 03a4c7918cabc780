use super::use_notices;
use crate::auth::{ServerFnAuthenticator, current_session, sign_in};
use crate::components_impl::{login_button_label, login_error_notice};
use crate::storage::BrowserStore;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

#[component]
pub fn AdminLoginPage() -> impl IntoView {
    let notices = use_notices();
    let navigate = use_navigate();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_loading, set_is_loading) = signal(false);

    // Already signed in: skip the form.
    Effect::new({
        let navigate = navigate.clone();
        move |_| {
            if current_session(&BrowserStore).is_some() {
                navigate("/admin/dashboard", Default::default());
            }
        }
    });

    let handle_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_loading.get_untracked() {
            return;
        }
        set_is_loading.set(true);

        let email = email.get_untracked();
        let password = password.get_untracked();
        let navigate = navigate.clone();

        leptos::task::spawn_local(async move {
            match sign_in(&BrowserStore, &ServerFnAuthenticator, &email, &password).await {
                Ok(_) => {
                    notices.success("Login successful!");
                    navigate("/admin/dashboard", Default::default());
                }
                Err(e) => notices.push(login_error_notice(&e)),
            }
            set_is_loading.set(false);
        });
    };

    view! {
        <div class="max-w-md mx-auto mt-10 card">
            <h1 class="text-2xl font-bold text-surface-900 mb-6">"Admin Login"</h1>
            <form on:submit=handle_submit class="space-y-4">
                <div class="form-group">
                    <label class="form-label form-label-required">"Email"</label>
                    <input
                        type="email"
                        class="form-input"
                        placeholder="admin@UrbanRide.com"
                        prop:value=email
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label class="form-label form-label-required">"Password"</label>
                    <input
                        type="password"
                        class="form-input"
                        prop:value=password
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                </div>
                <button type="submit" class="btn-primary w-full" disabled=move || is_loading.get()>
                    {move || login_button_label(is_loading.get())}
                </button>
            </form>
        </div>
    }
}
