use crate::components_impl::{
    detail_rows, payment_status_badge_class, payment_status_text, query_from_lookup,
};
use leptos::prelude::*;
use leptos_router::hooks::{use_params_map, use_query_map};

/// Target of the confirmation redirect. Renders whatever was carried
/// forward in the URL; nothing is fetched.
#[component]
pub fn BookingDetailsPage() -> impl IntoView {
    let params = use_params_map();
    let query_map = use_query_map();

    let booking_id = move || params.with(|p| p.get("id")).unwrap_or_default();
    let status = move || query_map.with(|q| q.get("paymentStatus"));
    let rows = move || query_map.with(|q| detail_rows(&query_from_lookup(|key| q.get(key))));

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-2xl font-bold text-surface-900">"Booking Details"</h1>
                    <p class="mt-1 text-sm text-surface-500">"Booking ID: " {booking_id}</p>
                </div>
                <span class=move || format!("badge {}", payment_status_badge_class(status().as_deref()))>
                    {move || payment_status_text(status().as_deref())}
                </span>
            </div>

            <div class="card">
                <dl class="grid grid-cols-2 gap-4">
                    {move || {
                        rows()
                            .into_iter()
                            .map(|(label, value)| {
                                view! {
                                    <dt class="text-sm text-surface-500">{label}</dt>
                                    <dd class="text-sm font-medium text-surface-900">{value}</dd>
                                }
                            })
                            .collect_view()
                    }}
                </dl>
            </div>
        </div>
    }
}
