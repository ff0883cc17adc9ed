#![allow(non_snake_case)]

mod components;
mod state;

use dioxus::prelude::*;
use staking_client::{Feature, StakingState};
use tracing_subscriber::EnvFilter;

use state::{build_controller, SharedController};

const STYLE: &str = include_str!("../assets/style.css");

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[layout(Layout)]
    #[route("/")]
    Overview {},
    #[route("/stake")]
    Stake {},
    #[route("/mint")]
    Mint {},
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let controller = match build_controller() {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    dioxus::LaunchBuilder::new()
        .with_context(controller)
        .launch(App);
}

#[component]
fn App() -> Element {
    let controller = use_context::<SharedController>();
    let staking = use_context_provider(|| Signal::new(controller.snapshot()));

    // Mirror every controller update into the reactive state.
    let source = controller.clone();
    use_future(move || {
        let controller = source.clone();
        let mut staking = staking;
        async move {
            let mut updates = controller.subscribe_state();
            staking.set(updates.borrow_and_update().clone());
            while updates.changed().await.is_ok() {
                let next: StakingState = updates.borrow_and_update().clone();
                staking.set(next);
            }
        }
    });

    // Pick up an already-authorized wallet session on launch.
    use_future(move || {
        let controller = controller.clone();
        async move {
            if let Err(e) = controller.restore().await {
                tracing::debug!("session restore failed: {e}");
            }
        }
    });

    rsx! {
        document::Style { {STYLE} }
        Router::<Route> {}
    }
}

// ---------------------------------------------------------------------------
// Layout: sidebar + content
// ---------------------------------------------------------------------------

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app-container",
            components::layout::Sidebar {}
            div { class: "main-panel",
                components::layout::TopBar {}
                components::layout::ErrorBanner {}
                div { class: "main-content",
                    Outlet::<Route> {}
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Route components: thin wrappers around the real components
// ---------------------------------------------------------------------------

#[component]
fn Overview() -> Element {
    rsx! { components::account::AccountPage {} }
}

#[component]
fn Stake() -> Element {
    rsx! { components::stake::StakePage {} }
}

#[component]
fn Mint() -> Element {
    let controller = use_context::<SharedController>();
    if controller.config().has(Feature::Mint) {
        rsx! { components::mint::MintPage {} }
    } else {
        rsx! {
            div { class: "page",
                h1 { "Mint" }
                p { class: "hint", "Minting is not available for this contract." }
            }
        }
    }
}
