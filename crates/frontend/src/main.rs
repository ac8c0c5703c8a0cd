use chrono::DateTime;
use gloo_net::http::Request;
use shared_types::{CalendarEvent, ErrorBody};
use yew::prelude::*;

enum FetchState {
    Loading,
    Ready(Vec<CalendarEvent>),
    Failed(String),
}

#[function_component(App)]
fn app() -> Html {
    let state = use_state(|| FetchState::Loading);

    // Fetch events once on mount; the session cookie travels with the
    // request.
    {
        let state = state.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                state.set(fetch_events().await);
            });
            || ()
        });
    }

    html! {
        <div class="app">
            <header>
                <h1>{"Calview"}</h1>
                <p class="subtitle">{"Your calendar, last month at a glance"}</p>
            </header>
            <main>
                {match &*state {
                    FetchState::Loading => html! {
                        <p class="status">{"Loading events…"}</p>
                    },
                    FetchState::Failed(message) => html! {
                        <p class="status error">{message.clone()}</p>
                    },
                    FetchState::Ready(events) if events.is_empty() => html! {
                        <p class="status">{"No events in the past month."}</p>
                    },
                    FetchState::Ready(events) => html! {
                        <ul class="event-list">
                            {for events.iter().map(event_item)}
                        </ul>
                    },
                }}
            </main>
        </div>
    }
}

fn event_item(event: &CalendarEvent) -> Html {
    html! {
        <li class="event">
            <div class="event-header">
                <span class="event-name">{&event.name}</span>
                <span class="event-date">{format_date(&event.date)}</span>
            </div>
            {if !event.location.is_empty() {
                html! { <div class="event-location">{&event.location}</div> }
            } else {
                html! {}
            }}
            {if !event.description.is_empty() {
                html! { <div class="event-description">{&event.description}</div> }
            } else {
                html! {}
            }}
        </li>
    }
}

/// Render an ISO-8601 start as a readable date, falling back to the raw
/// string for all-day dates or anything unparsable.
fn format_date(date: &str) -> String {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.format("%b %e, %Y %H:%M").to_string())
        .unwrap_or_else(|_| date.to_string())
}

async fn fetch_events() -> FetchState {
    let response = match Request::get("/api/events").send().await {
        Ok(response) => response,
        Err(e) => return FetchState::Failed(format!("Request failed: {e}")),
    };

    if response.ok() {
        match response.json::<Vec<CalendarEvent>>().await {
            Ok(events) => FetchState::Ready(events),
            Err(e) => FetchState::Failed(format!("Failed to parse response: {e}")),
        }
    } else {
        match response.json::<ErrorBody>().await {
            Ok(body) => FetchState::Failed(body.message),
            Err(_) => FetchState::Failed(format!("HTTP error: {}", response.status())),
        }
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
