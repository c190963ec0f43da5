// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request handling: map wire requests onto runtime managers.

use crate::engine::{
    BeadChanges, CreateBead, CreateDecision, RegisterProvider, Runtime, RuntimeError,
};
use crate::env::{PROTOCOL_VERSION, QUERY_WAIT};
use braid_core::{
    AgentId, BeadError, BeadId, BeadStatus, Clock, DecisionError, DecisionOption, Effect, Event,
    QueryId, QueryOutcome,
};
use braid_wire::{
    AgentSummary, BeadDetail, BeadSummary, DecisionSummary, ErrorKind, ProviderSummary, Query,
    Request, Response, StatusSummary,
};
use std::sync::Arc;

/// Dispatch one request to the right manager and shape the response.
pub(crate) async fn handle_request<C: Clock + 'static>(
    runtime: &Arc<Runtime<C>>,
    request: Request,
) -> Response {
    match request {
        Request::Hello { .. } => Response::Hello { version: PROTOCOL_VERSION.to_string() },
        Request::Ping => Response::Pong,
        Request::Shutdown => {
            runtime.stop();
            let _ = runtime.executor.sink().emit(&Event::Shutdown);
            Response::ShuttingDown
        }

        Request::CreateBead { project, title, description, priority, kind, tags, context } => {
            match runtime.create_bead(CreateBead {
                project,
                title,
                description,
                kind,
                priority,
                tags,
                context,
            }) {
                Ok(bead) => Response::Bead { bead: Some(Box::new(BeadDetail::from(&bead))) },
                Err(e) => error_response(e),
            }
        }

        Request::UpdateBead { id, changes } => {
            let status = match changes.status.as_deref().map(parse_status).transpose() {
                Ok(status) => status,
                Err(message) => return Response::error(ErrorKind::Validation, message),
            };
            let assigned_to = changes.assigned_to.map(|a| {
                if a.is_empty() {
                    None
                } else {
                    Some(AgentId::from_string(a))
                }
            });
            match runtime.update_bead(
                &id,
                BeadChanges {
                    title: changes.title,
                    description: changes.description,
                    status,
                    assigned_to,
                    priority: changes.priority,
                    tags: changes.tags,
                    context: changes.context,
                },
            ) {
                Ok(bead) => Response::Bead { bead: Some(Box::new(BeadDetail::from(&bead))) },
                Err(e) => error_response(e),
            }
        }

        Request::AddDependency { from, to, kind } => {
            match runtime.add_dependency(&from, &to, kind) {
                Ok(()) => Response::Ok,
                Err(e) => error_response(e),
            }
        }

        Request::ClaimBead { id, agent } => match runtime.claim_bead(&id, &agent) {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },

        Request::CreateDecision {
            project,
            question,
            options,
            recommendation,
            parent,
            requester,
            priority,
        } => {
            let options = options.into_iter().map(DecisionOption::new).collect();
            match runtime.create_decision(CreateDecision {
                project,
                question,
                options,
                recommendation,
                parent: parent.map(BeadId::from_string),
                requester: requester.map(AgentId::from_string),
                priority,
                title: None,
                context: Default::default(),
            }) {
                Ok(bead) => Response::Decision { id: bead.id.as_str().to_string() },
                Err(e) => error_response(e),
            }
        }

        Request::ClaimDecision { id, decider } => match runtime.claim_decision(&id, &decider) {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },

        Request::ResolveDecision { id, decider, decision, rationale } => {
            match runtime.resolve_decision(&id, &decider, &decision, rationale.as_deref()).await {
                Ok(()) => Response::Ok,
                Err(e) => error_response(e),
            }
        }

        Request::EscalateBead { id, reason, returned_to } => {
            match runtime.escalate_to_ceo(&id, &reason, returned_to.as_deref()) {
                Ok(decision) => Response::Decision { id: decision.id.as_str().to_string() },
                Err(e) => error_response(e),
            }
        }

        Request::SpawnAgent { project, name, role, persona_name, persona } => {
            match runtime.spawn_agent(crate::engine::SpawnAgent {
                project,
                name,
                role,
                persona_name,
                persona,
            }) {
                Ok(agent) => Response::Agent { id: agent.id.as_str().to_string() },
                Err(e) => error_response(e),
            }
        }

        Request::StopAgent { id, reason } => {
            match runtime.stop_agent(&id, reason.as_deref()) {
                Ok(()) => Response::Ok,
                Err(e) => error_response(e),
            }
        }

        Request::RegisterProvider { id, name, kind, endpoint, model } => {
            let provider_id = if id.is_empty() {
                None
            } else {
                Some(braid_core::ProviderId::from_string(id))
            };
            match runtime
                .register_provider(RegisterProvider {
                    id: provider_id,
                    name,
                    kind: kind.unwrap_or_else(|| "openai".to_string()),
                    endpoint,
                    configured_model: model,
                })
                .await
            {
                Ok(provider) => {
                    Response::Providers { providers: vec![ProviderSummary::from(&provider)] }
                }
                Err(e) => error_response(e),
            }
        }

        Request::UpdateProvider { id, name, endpoint, model } => {
            match runtime.update_provider(&id, name, endpoint, model).await {
                Ok(provider) => {
                    Response::Providers { providers: vec![ProviderSummary::from(&provider)] }
                }
                Err(e) => error_response(e),
            }
        }

        Request::DeleteProvider { id } => match runtime.delete_provider(&id).await {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },

        Request::NegotiateModel { id } => match runtime.negotiate_model(&id).await {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },

        Request::QueryProvider { provider, policy, system, message, temperature, max_tokens } => {
            handle_provider_query(runtime, provider, policy, system, message, temperature, max_tokens)
                .await
        }

        Request::SignalWorkflow { workflow, signal } => {
            match runtime.signal_workflow(&workflow, signal).await {
                Ok(()) => Response::Ok,
                Err(e) => error_response(e),
            }
        }

        Request::DispatchNow { project } => {
            let outcome = runtime.dispatch_once(project.as_deref()).await;
            Response::Dispatched {
                dispatched: outcome.dispatched,
                skipped: outcome
                    .skipped
                    .into_iter()
                    .map(|s| (s.subject, s.reason))
                    .collect(),
            }
        }

        Request::Query { query } => handle_query(runtime, query),
    }
}

/// Ephemeral provider query: pick a provider, fire the activity, wait for
/// its completion event on the bus.
async fn handle_provider_query<C: Clock + 'static>(
    runtime: &Arc<Runtime<C>>,
    provider: Option<String>,
    policy: Option<braid_core::SelectionPolicy>,
    system: Option<String>,
    message: String,
    temperature: f32,
    max_tokens: u32,
) -> Response {
    let selected = match provider {
        Some(id) => runtime.lock_state(|state| state.get_provider(&id).cloned()),
        None => runtime
            .registry
            .select(policy.unwrap_or(runtime.settings.selection_policy)),
    };
    let Some(selected) = selected else {
        return Response::error(ErrorKind::Unavailable, "no healthy provider available");
    };
    let Some(model) = selected.selected_model.clone() else {
        return Response::error(
            ErrorKind::Unavailable,
            format!("provider {} has no negotiated model", selected.id),
        );
    };

    let query_id = QueryId::new();
    // Subscribe before firing so the completion cannot race past us.
    let mut completions = {
        let wanted = query_id;
        runtime.executor.sink().bus().subscribe(move |event| {
            matches!(event, Event::QueryCompleted { id, .. } if *id == wanted)
        })
    };

    let endpoint = braid_providers::candidate_endpoints(&selected.endpoint, &selected.kind)
        .into_iter()
        .next()
        .unwrap_or_else(|| selected.endpoint.clone());
    let effect = Effect::QueryProvider {
        id: query_id,
        provider: selected.id,
        endpoint,
        model,
        system,
        message,
        temperature,
        max_tokens,
    };
    if let Err(e) = runtime.executor.execute(effect).await {
        return Response::error(ErrorKind::Internal, e.to_string());
    }

    match tokio::time::timeout(QUERY_WAIT, completions.recv()).await {
        Ok(Some(Event::QueryCompleted { outcome, .. })) => match outcome {
            QueryOutcome::Ok { response, model, tokens, latency_ms } => {
                Response::QueryResult { response, model, tokens, latency_ms }
            }
            QueryOutcome::Err { error } => Response::error(ErrorKind::Unavailable, error),
        },
        Ok(_) => Response::error(ErrorKind::Internal, "query channel closed"),
        Err(_) => Response::error(ErrorKind::Unavailable, "provider query timed out"),
    }
}

fn handle_query<C: Clock>(runtime: &Arc<Runtime<C>>, query: Query) -> Response {
    match query {
        Query::ListBeads { project, status, assigned_to, tag } => runtime.lock_state(|state| {
            let mut beads: Vec<BeadSummary> = state
                .beads
                .values()
                .filter(|b| project.as_deref().map(|p| b.project == p).unwrap_or(true))
                .filter(|b| {
                    status.as_deref().map(|s| b.status.to_string() == s).unwrap_or(true)
                })
                .filter(|b| {
                    assigned_to
                        .as_deref()
                        .map(|a| b.assigned_to.as_ref().map(|x| x.as_str()) == Some(a))
                        .unwrap_or(true)
                })
                .filter(|b| tag.as_deref().map(|t| b.tags.iter().any(|x| x == t)).unwrap_or(true))
                .map(BeadSummary::from)
                .collect();
            beads.sort_by(|a, b| a.id.cmp(&b.id));
            Response::Beads { beads }
        }),

        Query::GetBead { id } => runtime.lock_state(|state| Response::Bead {
            bead: state.get_bead(&id).map(|b| Box::new(BeadDetail::from(b))),
        }),

        Query::ReadyBeads { project } => runtime.lock_state(|state| Response::Beads {
            beads: state.ready_beads(&project).into_iter().map(BeadSummary::from).collect(),
        }),

        Query::WorkGraph { project } => runtime.lock_state(|state| {
            let graph = state.work_graph(&project);
            match serde_json::to_value(&graph) {
                Ok(graph) => Response::Graph { graph },
                Err(e) => Response::error(ErrorKind::Internal, e.to_string()),
            }
        }),

        Query::ListDecisions { project, pending_only } => runtime.lock_state(|state| {
            let mut decisions: Vec<DecisionSummary> = state
                .beads
                .values()
                .filter(|b| b.is_decision())
                .filter(|b| project.as_deref().map(|p| b.project == p).unwrap_or(true))
                .filter(|b| !pending_only || b.status != BeadStatus::Closed)
                .filter_map(|b| BeadDetail::from(b).decision)
                .collect();
            decisions.sort_by(|a, b| a.id.cmp(&b.id));
            Response::Decisions { decisions }
        }),

        Query::ListAgents { project } => runtime.lock_state(|state| {
            let mut agents: Vec<AgentSummary> = state
                .agents
                .values()
                .filter(|a| project.as_deref().map(|p| a.project == p).unwrap_or(true))
                .map(AgentSummary::from)
                .collect();
            agents.sort_by(|a, b| a.id.cmp(&b.id));
            Response::Agents { agents }
        }),

        Query::ListProviders { active_only } => {
            let providers = if active_only {
                runtime.registry.list_active()
            } else {
                runtime.registry.list()
            };
            Response::Providers {
                providers: providers.iter().map(ProviderSummary::from).collect(),
            }
        }

        Query::QueryWorkflow { workflow, query } => {
            match runtime.query_workflow(&workflow, query) {
                Ok(reply) => Response::Workflow { reply },
                Err(e) => error_response(e),
            }
        }

        Query::Status => runtime.lock_state(|state| {
            let status = StatusSummary {
                uptime_secs: runtime.uptime_secs(),
                projects: state.projects.len(),
                beads_open: state
                    .beads
                    .values()
                    .filter(|b| b.status == BeadStatus::Open)
                    .count(),
                beads_in_progress: state
                    .beads
                    .values()
                    .filter(|b| b.status == BeadStatus::InProgress)
                    .count(),
                agents_idle: state
                    .agents
                    .values()
                    .filter(|a| a.status == braid_core::AgentStatus::Idle)
                    .count(),
                agents_working: state
                    .agents
                    .values()
                    .filter(|a| a.status == braid_core::AgentStatus::Working)
                    .count(),
                providers_healthy: state.active_providers().len(),
            };
            Response::Status { status }
        }),
    }
}

fn parse_status(s: &str) -> Result<BeadStatus, String> {
    match s {
        "open" => Ok(BeadStatus::Open),
        "in_progress" => Ok(BeadStatus::InProgress),
        "blocked" => Ok(BeadStatus::Blocked),
        "closed" => Ok(BeadStatus::Closed),
        other => Err(format!("unknown field value for status: {other}")),
    }
}

/// Map runtime errors onto stable wire error kinds.
fn error_response(error: RuntimeError) -> Response {
    let kind = match &error {
        RuntimeError::Bead(BeadError::Conflict(_)) => ErrorKind::Conflict,
        RuntimeError::Bead(BeadError::NotFound(_) | BeadError::UnknownRef(_)) => {
            ErrorKind::NotFound
        }
        RuntimeError::Bead(BeadError::TerminalBead(_)) => ErrorKind::Terminal,
        RuntimeError::Bead(BeadError::CycleDetected { .. }) => ErrorKind::Cycle,
        RuntimeError::Bead(BeadError::InvalidProject(_) | BeadError::UnknownField(_)) => {
            ErrorKind::Validation
        }
        RuntimeError::Decision(DecisionError::NotFound(_)) => ErrorKind::NotFound,
        RuntimeError::Decision(DecisionError::DeciderMismatch { .. }) => {
            ErrorKind::DeciderMismatch
        }
        RuntimeError::Decision(DecisionError::AlreadyClaimed { .. }) => ErrorKind::AlreadyClaimed,
        RuntimeError::Decision(
            DecisionError::NotADecision(_) | DecisionError::AlreadyResolved(_),
        ) => ErrorKind::Validation,
        RuntimeError::AgentNotFound(_) | RuntimeError::ProviderNotFound(_) => ErrorKind::NotFound,
        RuntimeError::RoleNotAllowed { .. }
        | RuntimeError::InvalidRequest(_)
        | RuntimeError::UnknownWorkflow(_)
        | RuntimeError::InvalidSignal { .. } => ErrorKind::Validation,
        RuntimeError::NoProvider => ErrorKind::Unavailable,
        RuntimeError::Storage(_) => ErrorKind::Internal,
    };
    Response::error(kind, error.to_string())
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
