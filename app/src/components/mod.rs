use crate::components_impl::{MAX_NOTICES, notice_class, push_capped};
use crate::notifier::Notice;
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{A, Route, Router, Routes},
};

pub mod admin_dashboard;
pub mod admin_login;
pub mod booking_confirmation;
pub mod booking_details;

/// How long a toast stays up before closing itself.
#[cfg(target_arch = "wasm32")]
const NOTICE_LIFETIME: std::time::Duration = std::time::Duration::from_secs(4);

/// Toasts shared by every page.
#[derive(Clone, Copy)]
pub struct Notices {
    list: RwSignal<Vec<(u64, Notice)>>,
    next_id: StoredValue<u64>,
}

impl Notices {
    fn new() -> Self {
        Self {
            list: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn push(self, notice: Notice) {
        let Some(id) = self.next_id.try_update_value(|next| {
            *next += 1;
            *next
        }) else {
            return;
        };
        self.list
            .try_update(|list| push_capped(list, (id, notice), MAX_NOTICES));

        #[cfg(target_arch = "wasm32")]
        leptos::leptos_dom::helpers::set_timeout(move || self.dismiss(id), NOTICE_LIFETIME);
    }

    pub fn success(self, message: impl Into<String>) {
        self.push(Notice::success(message));
    }

    pub fn error(self, message: impl Into<String>) {
        self.push(Notice::error(message));
    }

    fn dismiss(self, id: u64) {
        self.list.try_update(|list| list.retain(|(i, _)| *i != id));
    }
}

/// Falls back to a detached stack when rendered outside [`App`].
pub fn use_notices() -> Notices {
    use_context::<Notices>().unwrap_or_else(Notices::new)
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let notices = Notices::new();
    provide_context(notices);

    view! {
        <Title text="UrbanRide"/>

        <Router>
            <nav class="bg-gray-800 text-white p-4">
                <div class="container mx-auto flex gap-4">
                    <A href="/" attr:class="hover:text-blue-400">"Home"</A>
                    <A href="/admin/login" attr:class="hover:text-blue-400">"Admin"</A>
                </div>
            </nav>

            <NoticeStack notices=notices/>

            <main class="container mx-auto p-4">
                <Routes fallback=|| "Page not found.">
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route
                        path=(StaticSegment("admin"), StaticSegment("login"))
                        view=admin_login::AdminLoginPage
                    />
                    <Route
                        path=(StaticSegment("admin"), StaticSegment("dashboard"))
                        view=admin_dashboard::AdminDashboardPage
                    />
                    <Route
                        path=(StaticSegment("booking"), StaticSegment("confirmation"))
                        view=booking_confirmation::BookingConfirmationPage
                    />
                    <Route
                        path=StaticSegment("confirm")
                        view=booking_confirmation::BookingConfirmationPage
                    />
                    <Route
                        path=(StaticSegment("booking"), ParamSegment("id"))
                        view=booking_details::BookingDetailsPage
                    />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn NoticeStack(notices: Notices) -> impl IntoView {
    view! {
        <div class="fixed top-4 right-4 z-50 space-y-2">
            {move || {
                notices
                    .list
                    .get()
                    .into_iter()
                    .map(|(id, notice)| {
                        view! {
                            <div class=notice_class(notice.kind) role="alert">
                                <span>{notice.message}</span>
                                <button
                                    type="button"
                                    class="btn-ghost btn-sm ml-2"
                                    on:click=move |_| notices.dismiss(id)
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    view! {
        <div class="text-center py-10">
            <h1 class="text-4xl font-bold mb-4">"UrbanRide"</h1>
            <p class="text-gray-600 mb-8">"Book a cab and track your confirmation"</p>
            <A href="/admin/login" attr:class="bg-blue-600 text-white px-6 py-3 rounded hover:bg-blue-700">
                "Admin Login"
            </A>
        </div>
    }
}
