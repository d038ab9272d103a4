// frontend/src/configs/mod.rs
//
// Saved tracker configurations: list, create, edit, delete. The form checks
// credentials and the workflow locally before anything is sent, and can ask
// the backend to test the connection and list the tracker's projects.

mod workflow_editor;

use crate::api::{self, Method};
use crate::app::{BUTTON_STYLE, INPUT_STYLE, PANEL_STYLE, PRIMARY_BUTTON_STYLE, Route};
use crate::notifications::{notify, use_toasts};
use cycletime_shared::workflow::validate_workflow;
use cycletime_shared::{
    Configuration, Credentials, NewConfiguration, NotificationKind, Project, ValidationResult,
};
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use workflow_editor::WorkflowEditor;

const LABEL_STYLE: &str = "display:flex; flex-direction:column; gap:4px; font-size:12px; color:#94a3b8;";

/// Everything the form can reject before talking to the backend.
pub fn check_draft(cfg: &NewConfiguration) -> Result<(), String> {
    if cfg.name.trim().is_empty() {
        return Err("Configuration name is required".to_string());
    }
    cfg.credentials.validate()?;
    if cfg.project_key.trim().is_empty() {
        return Err("Pick a project".to_string());
    }
    validate_workflow(&cfg.workflow).map_err(|e| e.to_string())
}

#[component]
pub fn ConfigurationList() -> Element {
    let configs = use_resource(|| async {
        api::get_json::<Vec<Configuration>>("/api/configurations").await
    });

    let body = match &*configs.read() {
        None => rsx! { div { style: "color:#64748b;", "Loading…" } },
        Some(Err(e)) => rsx! { div { style: "color:#fca5a5;", "Could not load configurations: {e}" } },
        Some(Ok(list)) if list.is_empty() => rsx! {
            div { style: "color:#94a3b8;", "No configurations saved yet." }
        },
        Some(Ok(list)) => rsx! {
            div { style: "display:flex; flex-direction:column; gap:8px;",
                for cfg in list.iter() {
                    ConfigurationRow { key: "{cfg.id}", cfg: cfg.clone(), configs }
                }
            }
        },
    };

    rsx! {
        div { style: "{PANEL_STYLE}",
            div { style: "display:flex; align-items:center; justify-content:space-between; margin-bottom:12px;",
                h2 { style: "margin:0; font-size:18px;", "Configurations" }
                Link { to: Route::CreateConfiguration {}, style: "{PRIMARY_BUTTON_STYLE} text-decoration:none;", "New configuration" }
            }
            {body}
        }
    }
}

#[component]
fn ConfigurationRow(
    cfg: Configuration,
    configs: Resource<Result<Vec<Configuration>, String>>,
) -> Element {
    let toasts = use_toasts();
    let id = cfg.id;
    let name = cfg.name.clone();

    rsx! {
        div {
            style: "display:flex; align-items:center; gap:12px; padding:10px 12px; border:1px solid #334155; border-radius:10px; background:#020617;",
            div { style: "flex:1;",
                div { style: "font-size:15px;", "{cfg.name}" }
                div { style: "color:#64748b; font-size:12px;",
                    "{cfg.project_key} · {cfg.credentials.base()} · {cfg.workflow.len()} states"
                }
            }
            Link { to: Route::EditConfiguration { id }, style: "color:#93c5fd;", "Edit" }
            button {
                style: "{BUTTON_STYLE} color:#fca5a5;",
                onclick: move |_| {
                    let name = name.clone();
                    let mut configs = configs;
                    spawn(async move {
                        match api::delete(&format!("/api/configurations/{id}")).await {
                            Ok(()) => {
                                notify(toasts, NotificationKind::Success, format!("Deleted {name}"));
                                configs.restart();
                            }
                            Err(e) => notify(toasts, NotificationKind::Error, e),
                        }
                    });
                },
                "Delete"
            }
        }
    }
}

#[component]
pub fn CreateConfiguration() -> Element {
    rsx! { ConfigurationForm { target: FormTarget::Create } }
}

#[component]
pub fn EditConfiguration(id: i64) -> Element {
    let cfg = use_resource(move || async move {
        api::get_json::<Configuration>(&format!("/api/configurations/{id}")).await
    });

    match &*cfg.read() {
        None => rsx! { div { style: "color:#64748b;", "Loading…" } },
        Some(Err(e)) => rsx! { div { style: "color:#fca5a5;", "Could not load configuration {id}: {e}" } },
        Some(Ok(c)) => rsx! {
            ConfigurationForm { key: "{c.id}", target: FormTarget::Edit(c.clone()) }
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    Create,
    Edit(Configuration),
}

impl FormTarget {
    fn draft(&self) -> NewConfiguration {
        match self {
            FormTarget::Create => NewConfiguration {
                name: String::new(),
                credentials: Credentials {
                    base_url: "https://".to_string(),
                    email: String::new(),
                    api_token: String::new(),
                },
                project_key: String::new(),
                workflow: Vec::new(),
            },
            FormTarget::Edit(cfg) => cfg.to_new(),
        }
    }

    fn id(&self) -> Option<i64> {
        match self {
            FormTarget::Create => None,
            FormTarget::Edit(cfg) => Some(cfg.id),
        }
    }
}

#[component]
fn ConfigurationForm(target: FormTarget) -> Element {
    let toasts = use_toasts();
    let nav = use_navigator();
    let existing_id = target.id();
    let draft = target.draft();

    let mut name = use_signal(|| draft.name.clone());
    let mut base_url = use_signal(|| draft.credentials.base_url.clone());
    let mut email = use_signal(|| draft.credentials.email.clone());
    let mut api_token = use_signal(|| draft.credentials.api_token.clone());
    let mut project_key = use_signal(|| draft.project_key.clone());
    let workflow = use_signal(|| draft.workflow.clone());
    let mut projects = use_signal(Vec::<Project>::new);
    let mut busy = use_signal(|| false);

    let credentials = move || Credentials {
        base_url: base_url(),
        email: email(),
        api_token: api_token(),
    };

    let test_connection = move |_: MouseEvent| {
        let creds = credentials();
        if let Err(e) = creds.validate() {
            notify(toasts, NotificationKind::Warning, e);
            return;
        }
        busy.set(true);
        spawn(async move {
            match api::send_json::<_, ValidationResult>(Method::Post, "/api/tracker/validate", &creds).await {
                Ok(r) if r.valid => notify(toasts, NotificationKind::Success, r.message),
                Ok(r) => notify(toasts, NotificationKind::Warning, r.message),
                Err(e) => notify(toasts, NotificationKind::Error, e),
            }
            busy.set(false);
        });
    };

    let load_projects = move |_: MouseEvent| {
        let creds = credentials();
        if let Err(e) = creds.validate() {
            notify(toasts, NotificationKind::Warning, e);
            return;
        }
        busy.set(true);
        spawn(async move {
            match api::send_json::<_, Vec<Project>>(Method::Post, "/api/tracker/projects", &creds).await {
                Ok(list) if list.is_empty() => {
                    notify(toasts, NotificationKind::Warning, "The tracker returned no projects");
                }
                Ok(list) => {
                    notify(toasts, NotificationKind::Info, format!("Loaded {} projects", list.len()));
                    projects.set(list);
                }
                Err(e) => notify(toasts, NotificationKind::Error, e),
            }
            busy.set(false);
        });
    };

    let save = move |_: MouseEvent| {
        let cfg = NewConfiguration {
            name: name().trim().to_string(),
            credentials: credentials(),
            project_key: project_key().trim().to_string(),
            workflow: workflow(),
        };
        if let Err(e) = check_draft(&cfg) {
            notify(toasts, NotificationKind::Warning, e);
            return;
        }
        busy.set(true);
        spawn(async move {
            let saved = match existing_id {
                Some(id) => {
                    api::send_json::<_, Configuration>(Method::Put, &format!("/api/configurations/{id}"), &cfg).await
                }
                None => api::send_json::<_, Configuration>(Method::Post, "/api/configurations", &cfg).await,
            };
            busy.set(false);
            match saved {
                Ok(saved) => {
                    notify(toasts, NotificationKind::Success, format!("Saved {}", saved.name));
                    let _ = nav.push(Route::ConfigurationList {});
                }
                Err(e) => notify(toasts, NotificationKind::Error, e),
            }
        });
    };

    let heading = if existing_id.is_some() { "Edit configuration" } else { "New configuration" };
    let known_projects = projects.read().clone();
    let current_key = project_key();

    rsx! {
        div { style: "{PANEL_STYLE} display:flex; flex-direction:column; gap:16px; max-width:900px;",
            h2 { style: "margin:0; font-size:18px;", "{heading}" }

            label { style: "{LABEL_STYLE}",
                "Name"
                input { style: "{INPUT_STYLE}", value: "{name()}", oninput: move |evt| name.set(evt.value()) }
            }

            div { style: "display:grid; grid-template-columns:repeat(auto-fit, minmax(240px, 1fr)); gap:12px;",
                label { style: "{LABEL_STYLE}",
                    "Tracker URL"
                    input {
                        style: "{INPUT_STYLE}",
                        placeholder: "https://your-team.atlassian.net",
                        value: "{base_url()}",
                        oninput: move |evt| base_url.set(evt.value()),
                    }
                }
                label { style: "{LABEL_STYLE}",
                    "Email"
                    input { style: "{INPUT_STYLE}", value: "{email()}", oninput: move |evt| email.set(evt.value()) }
                }
                label { style: "{LABEL_STYLE}",
                    "API token"
                    input {
                        style: "{INPUT_STYLE}",
                        r#type: "password",
                        value: "{api_token()}",
                        oninput: move |evt| api_token.set(evt.value()),
                    }
                }
            }

            div { style: "display:flex; gap:8px; flex-wrap:wrap;",
                button { style: "{BUTTON_STYLE}", disabled: busy(), onclick: test_connection, "Test connection" }
                button { style: "{BUTTON_STYLE}", disabled: busy(), onclick: load_projects, "Load projects" }
            }

            label { style: "{LABEL_STYLE}",
                "Project"
                if known_projects.is_empty() {
                    input {
                        style: "{INPUT_STYLE}",
                        placeholder: "Project key, or load projects above",
                        value: "{current_key}",
                        oninput: move |evt| project_key.set(evt.value()),
                    }
                } else {
                    select {
                        style: "{INPUT_STYLE}",
                        onchange: move |evt| project_key.set(evt.value()),
                        option { value: "", selected: current_key.is_empty(), "Select a project" }
                        for p in known_projects.iter() {
                            option {
                                value: "{p.key}",
                                selected: p.key == current_key,
                                "{p.key} · {p.name}"
                            }
                        }
                    }
                }
            }

            div { style: "display:flex; flex-direction:column; gap:6px;",
                div { style: "font-size:12px; color:#94a3b8;",
                    "Workflow (drag to reorder; mark where work starts and where it is done)"
                }
                WorkflowEditor { workflow }
            }

            div { style: "display:flex; gap:8px; justify-content:flex-end;",
                Link { to: Route::ConfigurationList {}, style: "{BUTTON_STYLE} text-decoration:none;", "Cancel" }
                button { style: "{PRIMARY_BUTTON_STYLE}", disabled: busy(), onclick: save, "Save" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycletime_shared::WorkflowState;
    use cycletime_shared::workflow::{add_state, toggle_end, toggle_start};

    fn workflow() -> Vec<WorkflowState> {
        let wf = add_state(&add_state(&add_state(&[], "To Do"), "Doing"), "Done");
        let wf = toggle_start(&wf, &wf[1].id);
        toggle_end(&wf, &wf[2].id)
    }

    fn draft() -> NewConfiguration {
        let mut cfg = FormTarget::Create.draft();
        cfg.name = "Platform".to_string();
        cfg.credentials = Credentials {
            base_url: "https://team.example.net".to_string(),
            email: "lead@example.net".to_string(),
            api_token: "secret".to_string(),
        };
        cfg.project_key = "PLAT".to_string();
        cfg.workflow = workflow();
        cfg
    }

    #[test]
    fn complete_draft_passes() {
        assert_eq!(check_draft(&draft()), Ok(()));
    }

    #[test]
    fn draft_problems_are_reported_in_form_order() {
        let mut cfg = draft();
        cfg.name = "  ".to_string();
        cfg.project_key.clear();
        assert_eq!(check_draft(&cfg).unwrap_err(), "Configuration name is required");

        let mut cfg = draft();
        cfg.project_key.clear();
        assert_eq!(check_draft(&cfg).unwrap_err(), "Pick a project");

        let mut cfg = draft();
        cfg.workflow = toggle_start(&cfg.workflow, &cfg.workflow[1].id);
        assert_eq!(check_draft(&cfg).unwrap_err(), "workflow needs a start point");
    }

    #[test]
    fn new_form_starts_blank() {
        let cfg = FormTarget::Create.draft();
        assert!(cfg.workflow.is_empty());
        assert!(check_draft(&cfg).is_err());
    }
}
