use dioxus::prelude::*;
use staking_client::amount::format_amount;

use crate::state::{use_staking, SharedController};

#[component]
pub fn AccountPage() -> Element {
    let staking = use_staking();
    let controller = use_context::<SharedController>();
    let decimals = controller.config().display_decimals;

    let mut busy = use_signal(|| false);

    let state = staking.read().clone();

    let on_refresh = move |_| {
        let controller = controller.clone();
        busy.set(true);
        spawn(async move {
            let _ = controller.refresh().await;
            busy.set(false);
        });
    };

    rsx! {
        div { class: "page",
            h1 { "Staking App" }

            if let Some(account) = state.session.account {
                div { class: "account-details",
                    p { class: "label", "Account: " span { class: "mono", "{account:?}" } }

                    match &state.view {
                        Some(view) => rsx! {
                            div { class: "result-card",
                                if !view.token_name.is_empty() {
                                    h3 { "{view.token_name}" }
                                }
                                p { "Balance: {format_amount(view.balance, decimals)} {view.token_symbol}" }
                                p { "Staked Amount: {format_amount(view.staked_amount, decimals)} {view.token_symbol}" }
                                p { "Rewards: {format_amount(view.rewards, decimals)}" }
                                if let Some(supply) = view.total_supply {
                                    p { "Total Supply: {format_amount(supply, decimals)} {view.token_symbol}" }
                                }
                            }
                        },
                        None => rsx! {
                            p { class: "hint", "Contract data not loaded yet." }
                        },
                    }

                    button {
                        class: "btn btn-primary",
                        disabled: *busy.read(),
                        onclick: on_refresh,
                        if *busy.read() { "Refreshing..." } else { "Refresh" }
                    }
                }
            } else {
                div { class: "empty-state",
                    div { class: "empty-icon", "⊘" }
                    h2 { class: "empty-title", "No wallet connected" }
                    p { class: "empty-desc",
                        "Hit Connect Wallet in the top-right corner to load your staking position."
                    }
                }
            }
        }
    }
}
