use dioxus::prelude::*;
use staking_client::amount::{format_amount, truncate_address};
use staking_client::Feature;

use super::connection_status::ConnectionStatusIndicator;
use crate::state::{use_staking, SharedController};
use crate::Route;

#[component]
pub fn Sidebar() -> Element {
    let controller = use_context::<SharedController>();
    let minting = controller.config().has(Feature::Mint);

    rsx! {
        nav { class: "sidebar",
            div { class: "sidebar-brand",
                span { class: "brand-icon", "◈" }
                span { class: "brand-text", "Staking App" }
            }
            div { class: "sidebar-nav",
                NavSection { label: "Account" }
                NavLink { to: Route::Overview {}, label: "Overview", icon: "⌂" }
                NavSection { label: "Staking" }
                NavLink { to: Route::Stake {}, label: "Stake", icon: "◎" }
                if minting {
                    NavLink { to: Route::Mint {}, label: "Mint", icon: "+" }
                }
            }
            div { class: "sidebar-footer",
                span { class: "sidebar-footer-text", "{truncate_contract(&controller)}" }
            }
        }
    }
}

#[component]
pub fn TopBar() -> Element {
    let staking = use_staking();
    let controller = use_context::<SharedController>();
    let decimals = controller.config().display_decimals;

    let state = staking.read();
    let account = state.session.account;
    let balance = state
        .view
        .as_ref()
        .map(|v| (format_amount(v.balance, decimals), v.token_symbol.clone()));

    rsx! {
        header { class: "topbar",
            div { class: "topbar-left",
                if let Some(account) = account {
                    div { class: "topbar-account mono", "{truncate_address(&account)}" }
                }
                if let Some((amount, symbol)) = balance {
                    div { class: "topbar-divider" }
                    div { class: "topbar-balance",
                        span { class: "topbar-label", "Balance" }
                        span { class: "topbar-value", "{amount} {symbol}" }
                    }
                }
            }
            div { class: "topbar-right",
                ConnectionStatusIndicator {}
            }
        }
    }
}

/// Most recent failure; stays until dismissed or replaced.
#[component]
pub fn ErrorBanner() -> Element {
    let staking = use_staking();
    let controller = use_context::<SharedController>();

    let last_error = staking.read().last_error.clone();

    rsx! {
        if let Some(msg) = last_error {
            div { class: "error-banner",
                p { class: "error-message", "Error: {msg}" }
                button {
                    class: "btn btn-ghost",
                    onclick: move |_| controller.dismiss_error(),
                    "Dismiss"
                }
            }
        }
    }
}

#[component]
fn NavSection(label: &'static str) -> Element {
    rsx! {
        div { class: "nav-section-label", "{label}" }
    }
}

#[component]
fn NavLink(to: Route, label: &'static str, icon: &'static str) -> Element {
    rsx! {
        Link { class: "nav-link", to: to,
            span { class: "nav-icon", "{icon}" }
            span { "{label}" }
        }
    }
}

fn truncate_contract(controller: &SharedController) -> String {
    match controller.config().contract_address() {
        Ok(address) => truncate_address(&address),
        Err(_) => controller.config().contract_address.clone(),
    }
}
