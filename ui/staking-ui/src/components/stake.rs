use dioxus::prelude::*;
use staking_client::{InputField, Operation};

use crate::state::{use_staking, SharedController};

#[component]
pub fn StakePage() -> Element {
    let staking = use_staking();
    let controller = use_context::<SharedController>();

    let state = staking.read().clone();
    let loading = state.is_loading();
    let stake_label = button_label(state.pending, Operation::Stake, "Stake");
    let unstake_label = button_label(state.pending, Operation::Unstake, "Unstake");
    let claim_label = button_label(state.pending, Operation::ClaimRewards, "Claim Rewards");

    let on_stake = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            spawn(async move {
                if let Ok(amount) = controller.amount_from_input(InputField::Stake) {
                    let _ = controller.stake(amount).await;
                }
            });
        }
    };

    let on_unstake = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            spawn(async move {
                if let Ok(amount) = controller.amount_from_input(InputField::Unstake) {
                    let _ = controller.unstake(amount).await;
                }
            });
        }
    };

    let on_claim = {
        let controller = controller.clone();
        move |_| {
            let controller = controller.clone();
            spawn(async move {
                let _ = controller.claim_rewards().await;
            });
        }
    };

    let stake_input = controller.clone();
    let unstake_input = controller.clone();

    rsx! {
        div { class: "page",
            h1 { "Stake" }
            p { class: "subtitle", "Lock tokens in the staking contract to earn rewards." }

            if state.is_connected() {
                div { class: "staking-section",
                    div { class: "form-group",
                        label { "Stake amount" }
                        input {
                            class: "input stake-input",
                            r#type: "text",
                            value: "{state.inputs.stake}",
                            oninput: move |e| stake_input.set_input(InputField::Stake, e.value()),
                        }
                        button {
                            class: "btn btn-primary action-button stake-button",
                            disabled: loading,
                            onclick: on_stake,
                            "{stake_label}"
                        }
                    }

                    div { class: "form-group",
                        label { "Unstake amount" }
                        input {
                            class: "input unstake-input",
                            r#type: "text",
                            value: "{state.inputs.unstake}",
                            oninput: move |e| unstake_input.set_input(InputField::Unstake, e.value()),
                        }
                        button {
                            class: "btn btn-primary action-button unstake-button",
                            disabled: loading,
                            onclick: on_unstake,
                            "{unstake_label}"
                        }
                    }

                    button {
                        class: "btn btn-primary action-button claim-button",
                        disabled: loading,
                        onclick: on_claim,
                        "{claim_label}"
                    }
                }
            } else {
                p { class: "hint", "Connect your wallet first." }
            }
        }
    }
}

/// Progress text on the button that started the pending operation.
pub fn button_label(pending: Option<Operation>, op: Operation, idle: &'static str) -> &'static str {
    match pending {
        Some(current) if current == op => op.progress_label(),
        _ => idle,
    }
}
