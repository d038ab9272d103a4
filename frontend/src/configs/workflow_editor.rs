// frontend/src/configs/workflow_editor.rs
//
// Ordered list of workflow states. Rows reorder by HTML5 drag and drop (or the
// arrow buttons); every edit replaces the whole list through the pure helpers
// in `cycletime_shared::workflow`.

use crate::app::{BUTTON_STYLE, INPUT_STYLE};
use cycletime_shared::WorkflowState;
use cycletime_shared::workflow::{
    add_state, move_item, remove_state, rename_state, toggle_end, toggle_start, validate_workflow,
};
use dioxus::prelude::*;

const ROW_STYLE: &str = "display:flex; align-items:center; gap:10px; padding:8px 10px; border:1px solid #334155; border-radius:10px; background:#020617;";
const SMALL_BUTTON_STYLE: &str = "padding:4px 8px; border-radius:8px; border:1px solid #334155; background:#111827; color:#e5e7eb; cursor:pointer;";

fn reorder(mut workflow: Signal<Vec<WorkflowState>>, from: usize, to: usize) {
    let next = move_item(&workflow.read(), from, to);
    workflow.set(next);
}

#[component]
pub fn WorkflowEditor(mut workflow: Signal<Vec<WorkflowState>>) -> Element {
    let dragging = use_signal(|| None::<usize>);
    let drop_target = use_signal(|| None::<usize>);
    let mut new_name = use_signal(String::new);

    let states = workflow.read().clone();
    let count = states.len();
    let problem = validate_workflow(&states).err().map(|e| e.to_string());

    let mut add = move || {
        let name = new_name();
        if name.trim().is_empty() {
            return;
        }
        let next = add_state(&workflow.read(), &name);
        workflow.set(next);
        new_name.set(String::new());
    };

    rsx! {
        div { style: "display:flex; flex-direction:column; gap:8px;",
            for (i, st) in states.into_iter().enumerate() {
                WorkflowRow {
                    key: "{st.id}",
                    workflow,
                    index: i,
                    count,
                    state: st.clone(),
                    highlighted: drop_target() == Some(i) && dragging() != Some(i),
                    dragging,
                    drop_target,
                }
            }

            if count == 0 {
                div { style: "color:#64748b; font-size:13px;", "No states yet. Add them in the order work flows through them." }
            }

            div { style: "display:flex; gap:8px; margin-top:4px;",
                input {
                    style: "{INPUT_STYLE} flex:1;",
                    placeholder: "New state, e.g. In Review",
                    value: "{new_name()}",
                    oninput: move |evt| new_name.set(evt.value()),
                    onkeydown: move |evt| {
                        if evt.key() == Key::Enter {
                            add();
                        }
                    },
                }
                button { style: "{BUTTON_STYLE}", onclick: move |_| add(), "Add state" }
            }

            if let Some(problem) = problem {
                div { style: "color:#fbbf24; font-size:12px;", "{problem}" }
            }
        }
    }
}

#[component]
fn WorkflowRow(
    mut workflow: Signal<Vec<WorkflowState>>,
    index: usize,
    count: usize,
    state: WorkflowState,
    highlighted: bool,
    mut dragging: Signal<Option<usize>>,
    mut drop_target: Signal<Option<usize>>,
) -> Element {
    let border = if highlighted { "border-color:#38bdf8;" } else { "" };
    let id_rename = state.id.clone();
    let id_start = state.id.clone();
    let id_end = state.id.clone();
    let id_remove = state.id.clone();

    rsx! {
        div {
            style: "{ROW_STYLE} {border}",
            draggable: "true",
            ondragstart: move |_| dragging.set(Some(index)),
            ondragenter: move |_| drop_target.set(Some(index)),
            ondragover: move |evt: DragEvent| evt.prevent_default(),
            ondrop: move |evt: DragEvent| {
                evt.prevent_default();
                if let Some(from) = dragging() {
                    reorder(workflow, from, index);
                }
                dragging.set(None);
                drop_target.set(None);
            },
            ondragend: move |_| {
                dragging.set(None);
                drop_target.set(None);
            },

            span { style: "cursor:grab; color:#64748b; user-select:none;", "⠿" }
            span { style: "color:#64748b; font-size:12px; width:20px;", "{index + 1}." }
            input {
                style: "{INPUT_STYLE} flex:1;",
                value: "{state.name}",
                oninput: move |evt| {
                    let next = rename_state(&workflow.read(), &id_rename, &evt.value());
                    workflow.set(next);
                },
            }
            label { style: "display:flex; align-items:center; gap:4px; font-size:12px; color:#94a3b8;",
                input {
                    r#type: "checkbox",
                    checked: state.is_start_point,
                    onchange: move |_| {
                        let next = toggle_start(&workflow.read(), &id_start);
                        workflow.set(next);
                    },
                }
                "Start"
            }
            label { style: "display:flex; align-items:center; gap:4px; font-size:12px; color:#94a3b8;",
                input {
                    r#type: "checkbox",
                    checked: state.is_end_point,
                    onchange: move |_| {
                        let next = toggle_end(&workflow.read(), &id_end);
                        workflow.set(next);
                    },
                }
                "End"
            }
            button {
                style: "{SMALL_BUTTON_STYLE}",
                disabled: index == 0,
                onclick: move |_| reorder(workflow, index, index.saturating_sub(1)),
                "↑"
            }
            button {
                style: "{SMALL_BUTTON_STYLE}",
                disabled: index + 1 >= count,
                onclick: move |_| reorder(workflow, index, index + 1),
                "↓"
            }
            button {
                style: "{SMALL_BUTTON_STYLE} color:#fca5a5;",
                onclick: move |_| {
                    let next = remove_state(&workflow.read(), &id_remove);
                    workflow.set(next);
                },
                "Remove"
            }
        }
    }
}
