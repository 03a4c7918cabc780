//! Confirmation page: guard, resolution, overlay sequence, email action.

use super::{Notices, use_notices};
use crate::backend::ServerFnBackend;
use crate::components_impl::{email_button_label, email_status_text, query_from_lookup};
use crate::error::BookingError;
use crate::notifier::{ConfirmationMailer, SEND_DELAY, confirmation_body};
use crate::resolver::{BookingResolver, ResolveContext, Resolution, check_required, random_suffix};
use crate::sequencer::{Phase, Sequencer};
use crate::storage::{BrowserStore, load_user_profile};
use crate::types::{BookingQuery, BookingSummary, ViewKind};
use futures::future::{AbortHandle, abortable};
use leptos::leptos_dom::helpers::{TimeoutHandle, set_timeout_with_handle};
use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate, use_query_map};
use std::rc::Rc;
use tracing::{debug, info, warn};

type Navigate = Rc<dyn Fn(&str)>;

/// Timers and in-flight work owned by one page instance.
#[derive(Clone, Copy)]
struct PageTasks {
    sequencer: StoredValue<Option<Sequencer>>,
    overlay_timer: StoredValue<Option<TimeoutHandle>>,
    email_timer: StoredValue<Option<TimeoutHandle>>,
    resolution: StoredValue<Option<AbortHandle>>,
}

impl PageTasks {
    fn new() -> Self {
        Self {
            sequencer: StoredValue::new(None),
            overlay_timer: StoredValue::new(None),
            email_timer: StoredValue::new(None),
            resolution: StoredValue::new(None),
        }
    }

    /// Stop everything still pending. Safe to call after disposal.
    fn cancel(self) {
        self.sequencer.try_update_value(|seq| {
            if let Some(seq) = seq {
                seq.cancel();
            }
        });
        for timer in [self.overlay_timer, self.email_timer] {
            if let Some(handle) = timer.try_update_value(Option::take).flatten() {
                handle.clear();
            }
        }
        if let Some(handle) = self.resolution.try_update_value(Option::take).flatten() {
            handle.abort();
        }
    }
}

fn schedule_overlay(tasks: PageTasks, phase: RwSignal<Phase>, navigate: Navigate) {
    let Some(delay) = tasks
        .sequencer
        .try_with_value(|seq| seq.as_ref().and_then(Sequencer::pending_delay))
        .flatten()
    else {
        return;
    };

    let handle = set_timeout_with_handle(
        {
            let navigate = Rc::clone(&navigate);
            move || {
                let step = tasks
                    .sequencer
                    .try_update_value(|seq| {
                        let seq = seq.as_mut()?;
                        let next = seq.advance()?;
                        Some((next, seq.redirect_target().map(str::to_string)))
                    })
                    .flatten();
                let Some((next, redirect)) = step else {
                    return;
                };

                phase.set(next);
                match redirect {
                    Some(url) => {
                        info!("Redirecting to booking details page");
                        navigate(&url);
                    }
                    None => schedule_overlay(tasks, phase, navigate),
                }
            }
        },
        delay,
    );

    match handle {
        Ok(handle) => tasks.overlay_timer.set_value(Some(handle)),
        Err(e) => warn!("Could not schedule overlay transition: {:?}", e),
    }
}

fn start_resolution(
    tasks: PageTasks,
    query: BookingQuery,
    view: ViewKind,
    resolution: RwSignal<Option<Resolution>>,
    mailer: RwSignal<ConfirmationMailer>,
) {
    let work = async move {
        let store = BrowserStore;
        let backend = ServerFnBackend;
        let ctx = ResolveContext {
            view,
            now: chrono::Local::now().naive_local(),
            suffix: random_suffix(),
            user: load_user_profile(&store, &query),
        };
        let resolver = BookingResolver::new(&backend, &store);
        resolver.record_visit(&query, &ctx);
        resolver.resolve(&query, &ctx).await
    };

    let (work, handle) = abortable(work);
    tasks.resolution.set_value(Some(handle));

    leptos::task::spawn_local(async move {
        match work.await {
            Ok(resolved) => {
                if !resolved.diagnostics.is_empty() {
                    debug!("Resolution diagnostics: {:?}", resolved.diagnostics);
                }
                let email_sent = resolved.email_sent;
                if resolution.try_set(Some(resolved)).is_none() {
                    mailer.set(ConfirmationMailer::new(email_sent));
                } else {
                    debug!("Page closed before booking resolution finished");
                }
            }
            Err(_) => debug!("Booking resolution aborted"),
        }
    });
}

fn send_confirmation(
    tasks: PageTasks,
    summary: &BookingSummary,
    mailer: RwSignal<ConfirmationMailer>,
    notices: Notices,
) {
    let Some(recipient) = mailer.try_update(|m| m.begin(summary)).flatten() else {
        return;
    };
    let body = confirmation_body(summary);

    let scheduled = set_timeout_with_handle(
        {
            let recipient = recipient.clone();
            move || {
                let outcome = body.map(|text| debug!("Simulated confirmation email:\n{}", text));
                if let Some(notice) = mailer.try_update(|m| m.finish(&recipient, outcome)) {
                    notices.push(notice);
                }
            }
        },
        SEND_DELAY,
    );

    match scheduled {
        Ok(handle) => tasks.email_timer.set_value(Some(handle)),
        Err(e) => {
            let failure = BookingError::Storage(format!("could not schedule send: {e:?}"));
            if let Some(notice) = mailer.try_update(|m| m.finish(&recipient, Err(failure))) {
                notices.push(notice);
            }
        }
    }
}

#[component]
pub fn BookingConfirmationPage() -> impl IntoView {
    let notices = use_notices();
    let query_map = use_query_map();
    let location = use_location();
    let navigate = use_navigate();

    let query = Memo::new(move |_| query_map.with(|map| query_from_lookup(|key| map.get(key))));
    let resolution = RwSignal::new(None::<Resolution>);
    let phase = RwSignal::new(Phase::Idle);
    let mailer = RwSignal::new(ConfirmationMailer::default());
    let tasks = PageTasks::new();

    let go: Navigate = Rc::new(move |url: &str| navigate(url, Default::default()));

    Effect::new(move |_| {
        let query = query.get();
        let view = ViewKind::from_path(&location.pathname.get_untracked());
        tasks.cancel();
        resolution.set(None);
        phase.set(Phase::Idle);

        if let Err(e) = check_required(&query) {
            notices.error(e.to_string());
            go("/");
            return;
        }

        tasks.sequencer.set_value(Some(Sequencer::for_query(&query)));
        schedule_overlay(tasks, phase, Rc::clone(&go));
        start_resolution(tasks, query, view, resolution, mailer);
    });

    on_cleanup(move || tasks.cancel());

    view! {
        {move || match resolution.get() {
            None => view! { <ProcessingView/> }.into_any(),
            Some(resolved) => {
                view! {
                    <BookingSummaryView
                        resolved=resolved
                        phase=phase
                        mailer=mailer
                        on_send=move |summary: BookingSummary| {
                            send_confirmation(tasks, &summary, mailer, notices);
                        }
                    />
                }
                    .into_any()
            }
        }}
    }
}

#[component]
fn ProcessingView() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center py-20">
            <div class="spinner mb-4"/>
            <p class="text-surface-600">"Processing your booking..."</p>
        </div>
    }
}

#[component]
fn BookingSummaryView(
    resolved: Resolution,
    phase: RwSignal<Phase>,
    mailer: RwSignal<ConfirmationMailer>,
    on_send: impl Fn(BookingSummary) + Send + Sync + 'static,
) -> impl IntoView {
    let summary = resolved.summary;
    let email = summary.email.clone();
    let has_email = !email.is_empty();
    let for_send = summary.clone();

    view! {
        <div class="space-y-6" data-resolution-source=resolved.source.as_str()>
            <Show when=move || phase.get().shows_payment_overlay()>
                <div class="modal-backdrop">
                    <div class="modal-content text-center p-8">
                        <div class="spinner mx-auto mb-4"/>
                        <h2 class="text-xl font-semibold">"Processing Payment"</h2>
                        <p class="text-surface-500">"Please wait while we confirm your payment..."</p>
                    </div>
                </div>
            </Show>
            <Show when=move || phase.get().shows_confirmed_overlay()>
                <div class="modal-backdrop">
                    <div class="modal-content text-center p-8">
                        <h2 class="text-xl font-semibold text-success-600">"Booking Confirmed!"</h2>
                        <p class="text-surface-500">"Your cab has been booked successfully"</p>
                    </div>
                </div>
            </Show>

            <div class="card">
                <h1 class="text-2xl font-bold text-surface-900">"Booking Confirmed"</h1>
                <p class="mt-1 text-sm text-surface-500">"Booking ID: " {summary.id.clone()}</p>
            </div>

            <div class="card space-y-2">
                <h2 class="text-lg font-semibold">"Journey Details"</h2>
                <p>{summary.from.clone()} " → " {summary.to.clone()}</p>
                <p>"Travel date: " {summary.travel_date.clone()}</p>
                <p>"Booked on " {summary.date.clone()} " at " {summary.time.clone()}</p>
                <p>"Cab: " {summary.cab_type.clone()}</p>
            </div>

            <div class="card space-y-2">
                <h2 class="text-lg font-semibold">"Payment"</h2>
                <p class="text-xl font-bold">{summary.price.clone()}</p>
                <p class="text-surface-500">{summary.payment_method.clone()}</p>
            </div>

            <div class="card space-y-2">
                <h2 class="text-lg font-semibold">"Contact"</h2>
                <p>{move || mailer.with(|m| email_status_text(m, &email))}</p>
                {summary.mobile.clone().map(|mobile| view! { <p>"Mobile: " {mobile}</p> })}
                <button
                    type="button"
                    class="btn-primary"
                    disabled=move || !has_email || mailer.with(ConfirmationMailer::is_in_flight)
                    on:click=move |_| on_send(for_send.clone())
                >
                    {move || mailer.with(email_button_label)}
                </button>
            </div>
        </div>
    }
}
