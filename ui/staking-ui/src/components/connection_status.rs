use dioxus::prelude::*;
use staking_client::ConnectionStatus;

use crate::state::{use_staking, SharedController};

#[component]
pub fn ConnectionStatusIndicator() -> Element {
    let staking = use_staking();
    let controller = use_context::<SharedController>();

    let status = staking.read().status;

    let (dot_class, label) = match status {
        ConnectionStatus::Disconnected => ("dot disconnected", "Disconnected"),
        ConnectionStatus::Connecting => ("dot connecting", "Connecting"),
        ConnectionStatus::Connected => ("dot connected", "Connected"),
    };

    let controller_for_disconnect = controller.clone();
    let connect = move |_| {
        let controller = controller.clone();
        spawn(async move {
            // Failures land in the shared error banner.
            let _ = controller.connect().await;
        });
    };

    let disconnect = move |_| {
        controller_for_disconnect.disconnect();
    };

    rsx! {
        div { class: "conn-indicator",
            span { class: dot_class }
            span { class: "conn-label", "{label}" }
            if status == ConnectionStatus::Connected {
                button { class: "conn-btn conn-btn-disconnect", onclick: disconnect, "Disconnect" }
            } else {
                button {
                    class: "conn-btn conn-btn-connect",
                    disabled: status == ConnectionStatus::Connecting,
                    onclick: connect,
                    "Connect Wallet"
                }
            }
        }
    }
}
