//! Scenario traversals.
//!
//! Each builder is a fixed, hand-written walk over the graph. Node selection
//! only ever depends on graph queries, never on step results, so the same
//! graph always yields the same steps.

use super::run::{FlowRun, describe_args, named_args, namespace_args};
use kube_flow_domain::{GraphNode, MeshKind, ResourceGraph, Scenario, ToolError};

impl FlowRun {
    pub(super) async fn run_scenario(
        &mut self,
        scenario: Scenario,
        graph: &ResourceGraph,
        entry: &GraphNode,
    ) -> Result<(), ToolError> {
        match scenario {
            Scenario::Traffic => self.traffic(graph, entry).await,
            Scenario::Pending => self.pending(graph, entry).await,
            Scenario::Crashloop => self.crashloop(graph, entry).await,
            Scenario::Autoscaling => self.autoscaling(entry).await,
            Scenario::NetworkPolicy => self.network_policy(graph, entry).await,
            Scenario::Mesh => self.mesh(graph, entry).await,
        }
    }

    async fn describe(&mut self, node: &GraphNode, notes: &str) -> Result<(), ToolError> {
        let tool = self.tools.describe.clone();
        self.add_step(node, Some(tool), describe_args(node), notes).await
    }

    async fn traffic(&mut self, graph: &ResourceGraph, entry: &GraphNode) -> Result<(), ToolError> {
        self.describe(entry, "Describe the entry resource").await?;

        let services = services_for(graph, entry);
        if services.is_empty() {
            self.add_step(
                entry,
                None,
                describe_args(entry),
                "No services related to the entry were found in the graph",
            )
            .await?;
        }
        for service in &services {
            let tool = self.tools.network.clone();
            self.add_step(
                service,
                Some(tool),
                named_args(service, "service"),
                "Check selectors, endpoints and ports of the service",
            )
            .await?;
        }

        let mut pods = backend_pods_for(graph, &services);
        for pod in pods.iter().filter(|pod| pod.id != entry.id) {
            self.describe(pod, "Describe a backend pod of the service").await?;
        }

        // the entry pod's own workload counts even when other backends exist
        if entry.is_pod() && !pods.iter().any(|pod| pod.id == entry.id) {
            pods.insert(0, entry.clone());
        }
        for owner in owners_for(graph, &pods) {
            if owner.id != entry.id {
                self.describe(&owner, "Describe the workload that owns the pods").await?;
            }
        }
        Ok(())
    }

    async fn pending(&mut self, graph: &ResourceGraph, entry: &GraphNode) -> Result<(), ToolError> {
        let tool = self.tools.scheduling.clone();
        let namespace = self.namespace.clone();
        self.add_step(
            entry,
            Some(tool),
            namespace_args(&namespace),
            "Find unschedulable pods and scheduler events in the namespace",
        )
        .await?;

        let pods = relevant_pods(graph, entry);
        if pods.is_empty() {
            self.no_pods_found(entry).await?;
        }
        for pod in &pods {
            self.describe(pod, "Describe the pod to read its scheduling conditions").await?;
            let tool = self.tools.storage.clone();
            self.add_step(
                pod,
                Some(tool),
                named_args(pod, "pod"),
                "Check that the pod's volumes and claims can be bound",
            )
            .await?;
        }
        Ok(())
    }

    async fn crashloop(&mut self, graph: &ResourceGraph, entry: &GraphNode) -> Result<(), ToolError> {
        let tool = self.tools.crashloop.clone();
        let namespace = self.namespace.clone();
        self.add_step(
            entry,
            Some(tool),
            namespace_args(&namespace),
            "Find restarting containers and their last termination reasons",
        )
        .await?;

        let pods = relevant_pods(graph, entry);
        if pods.is_empty() {
            self.no_pods_found(entry).await?;
        }
        for pod in &pods {
            self.describe(pod, "Describe the pod to read container states").await?;
            let tool = self.tools.config_references.clone();
            self.add_step(
                pod,
                Some(tool),
                named_args(pod, "pod"),
                "Check that referenced config maps and secrets exist",
            )
            .await?;
            let tool = self.tools.storage.clone();
            self.add_step(
                pod,
                Some(tool),
                named_args(pod, "pod"),
                "Check that the pod's volumes mount",
            )
            .await?;
        }
        Ok(())
    }

    async fn autoscaling(&mut self, entry: &GraphNode) -> Result<(), ToolError> {
        self.describe(entry, "Describe the scaled workload").await?;

        let namespace = self.namespace.clone();
        let checks = [
            (self.tools.hpa.clone(), "Check horizontal autoscaler targets and events"),
            (self.tools.vpa.clone(), "Check vertical autoscaler recommendations"),
            (self.tools.resource_usage.clone(), "Compare resource usage with requests"),
        ];
        for (tool, notes) in checks {
            self.add_step(entry, Some(tool), namespace_args(&namespace), notes).await?;
        }
        Ok(())
    }

    async fn network_policy(&mut self, graph: &ResourceGraph, entry: &GraphNode) -> Result<(), ToolError> {
        self.describe(entry, "Describe the entry resource").await?;

        let services = services_for(graph, entry);
        let mut pods = backend_pods_for(graph, &services);
        if entry.is_pod() && !pods.iter().any(|pod| pod.id == entry.id) {
            pods.insert(0, entry.clone());
        }

        let pod_refs: Vec<&GraphNode> = pods.iter().collect();
        let policies: Vec<GraphNode> = graph.related_policies(&pod_refs).into_iter().cloned().collect();
        if policies.is_empty() {
            self.add_step(
                entry,
                None,
                describe_args(entry),
                "No policies select or block the pods behind the entry",
            )
            .await?;
        }
        for policy in &policies {
            self.describe(policy, "Describe a policy that selects or blocks the pods").await?;
        }
        Ok(())
    }

    async fn mesh(&mut self, graph: &ResourceGraph, entry: &GraphNode) -> Result<(), ToolError> {
        self.describe(entry, "Describe the entry resource").await?;

        let namespace = self.namespace.clone();
        let mut detected = false;
        for mesh in MeshKind::ALL {
            let Some(marker) = mesh.find_marker(graph) else {
                continue;
            };
            detected = true;
            let tool = self.tools.mesh(mesh).to_string();
            self.add_step(
                marker,
                Some(tool),
                namespace_args(&namespace),
                format!("{} marker found on {}", mesh, marker.id),
            )
            .await?;
        }

        if !detected {
            self.add_step(
                entry,
                None,
                describe_args(entry),
                "No service mesh markers were found in the graph",
            )
            .await?;
        }
        Ok(())
    }

    async fn no_pods_found(&mut self, entry: &GraphNode) -> Result<(), ToolError> {
        self.add_step(
            entry,
            None,
            describe_args(entry),
            "No pods related to the entry were found in the graph",
        )
        .await
    }
}

/// The entry itself when it is a service, otherwise services related to it
fn services_for(graph: &ResourceGraph, entry: &GraphNode) -> Vec<GraphNode> {
    if entry.is_service() {
        return vec![entry.clone()];
    }
    graph.related_services(entry).into_iter().cloned().collect()
}

fn backend_pods_for(graph: &ResourceGraph, services: &[GraphNode]) -> Vec<GraphNode> {
    let refs: Vec<&GraphNode> = services.iter().collect();
    graph.backend_pods(&refs).into_iter().cloned().collect()
}

fn owners_for(graph: &ResourceGraph, pods: &[GraphNode]) -> Vec<GraphNode> {
    let refs: Vec<&GraphNode> = pods.iter().collect();
    graph.owners(&refs).into_iter().cloned().collect()
}

/// Pods a pod-level scenario should look at: the entry itself, a service's
/// backends, a workload's pods, or failing all of those every pod in the
/// graph.
fn relevant_pods(graph: &ResourceGraph, entry: &GraphNode) -> Vec<GraphNode> {
    if entry.is_pod() {
        return vec![entry.clone()];
    }
    let pods: Vec<&GraphNode> = if entry.is_service() {
        graph.backend_pods(&[entry])
    } else if entry.is_workload() {
        graph.owned_pods(entry)
    } else {
        graph.pods()
    };
    pods.into_iter().cloned().collect()
}
