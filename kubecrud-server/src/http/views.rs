//! HTML rendering for the message and cluster pages
//!
//! Pages are plain `format!` templates. Every value that came from a user or
//! from the cluster goes through [`escape`].

use std::fmt::Write as _;

use crate::db::Message;
use crate::k8s::{DeploymentSummary, PodSummary};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_dash(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_else(|| "-".to_string())
}

fn count_or_dash(value: Option<i32>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

fn page(title: &str, width: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-100 flex items-center justify-center min-h-screen p-4">
    <div class="bg-white p-8 rounded-lg shadow-xl {width} w-full">
{body}
    </div>
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Home page: connection status, messages and the add form.
pub fn home(db_status: &str, messages: &[Message]) -> String {
    let mut list = String::new();
    if messages.is_empty() {
        list.push_str(r#"<p class="text-gray-600">No messages yet. Add one below!</p>"#);
    } else {
        list.push_str(r#"<ul class="space-y-4">"#);
        for message in messages {
            let _ = write!(
                list,
                r#"
            <li class="p-3 bg-gray-50 rounded-md shadow-sm flex justify-between items-center">
                <div>
                    <span class="font-medium text-gray-800">{content}</span>
                    <span class="text-sm text-gray-500 block">(Added: {added})</span>
                </div>
                <div class="flex space-x-2">
                    <a href="/edit_message/{id}" class="bg-yellow-500 text-white font-bold py-1 px-3 rounded-md text-sm">Edit</a>
                    <form action="/delete_message/{id}" method="post" onsubmit="return confirm('Delete this message?');">
                        <button type="submit" class="bg-red-500 text-white font-bold py-1 px-3 rounded-md text-sm">Delete</button>
                    </form>
                </div>
            </li>"#,
                id = message.id,
                content = escape(&message.content),
                added = message.timestamp.format(TIMESTAMP_FORMAT),
            );
        }
        list.push_str("\n        </ul>");
    }

    let body = format!(
        r#"        <h1 class="text-3xl font-bold mb-4 text-blue-600 text-center">Messages on PostgreSQL</h1>
        <p class="text-lg text-gray-700 mb-6 text-center">Database Status: <span class="font-semibold">{status}</span></p>
        <div class="mb-8">
            <h2 class="text-2xl font-semibold mb-4 text-gray-800">Messages:</h2>
            {list}
        </div>
        <div class="mb-8">
            <h2 class="text-2xl font-semibold mb-4 text-gray-800">Add New Message:</h2>
            <form action="/add_message" method="post" class="space-y-4">
                <input type="text" name="content" placeholder="Enter your message" required maxlength="255"
                       class="w-full p-3 border border-gray-300 rounded-md">
                <button type="submit" class="w-full bg-blue-500 text-white font-bold py-2 px-4 rounded-md">Add Message</button>
            </form>
        </div>
        <p class="mt-4 text-center"><a href="/k8s-info" class="text-blue-500 font-medium">Kubernetes resources in this namespace</a></p>"#,
        status = escape(db_status),
    );

    page("Messages", "max-w-3xl", &body)
}

/// Edit form for a single message.
pub fn edit(message: &Message) -> String {
    let body = format!(
        r#"        <h1 class="text-3xl font-bold mb-6 text-blue-600 text-center">Edit Message (ID: {id})</h1>
        <form action="/edit_message/{id}" method="post" class="space-y-4">
            <input type="text" name="content" value="{content}" required maxlength="255"
                   class="w-full p-3 border border-gray-300 rounded-md">
            <button type="submit" class="w-full bg-green-500 text-white font-bold py-2 px-4 rounded-md">Update Message</button>
        </form>
        <p class="mt-4 text-center"><a href="/" class="text-blue-500 font-medium">Back to Home</a></p>"#,
        id = message.id,
        content = escape(&message.content),
    );

    page("Edit Message", "max-w-lg", &body)
}

/// Pods and deployments in `namespace`.
pub fn cluster(namespace: &str, pods: &[PodSummary], deployments: &[DeploymentSummary]) -> String {
    let mut pod_list = String::new();
    if pods.is_empty() {
        pod_list.push_str(r#"<p class="text-gray-600 mb-6">No pods found in this namespace.</p>"#);
    } else {
        pod_list.push_str(r#"<ul class="list-disc pl-5 mb-6">"#);
        for pod in pods {
            let _ = write!(
                pod_list,
                r#"
            <li class="mb-2">
                <span class="font-medium text-gray-700">Name:</span> {name}<br>
                <span class="font-medium text-gray-700">Status:</span> {status}<br>
                <span class="font-medium text-gray-700">IP:</span> {ip}<br>
                <span class="font-medium text-gray-700">Node:</span> {node}
            </li>"#,
                name = escape(&pod.name),
                status = or_dash(pod.status.as_deref()),
                ip = or_dash(pod.ip.as_deref()),
                node = or_dash(pod.node.as_deref()),
            );
        }
        pod_list.push_str("\n        </ul>");
    }

    let mut deployment_list = String::new();
    if deployments.is_empty() {
        deployment_list
            .push_str(r#"<p class="text-gray-600 mb-6">No deployments found in this namespace.</p>"#);
    } else {
        deployment_list.push_str(r#"<ul class="list-disc pl-5 mb-6">"#);
        for deployment in deployments {
            let _ = write!(
                deployment_list,
                r#"
            <li class="mb-2">
                <span class="font-medium text-gray-700">Name:</span> {name}<br>
                <span class="font-medium text-gray-700">Replicas:</span> {replicas}<br>
                <span class="font-medium text-gray-700">Available:</span> {available}
            </li>"#,
                name = escape(&deployment.name),
                replicas = count_or_dash(deployment.replicas),
                available = count_or_dash(deployment.available_replicas),
            );
        }
        deployment_list.push_str("\n        </ul>");
    }

    let body = format!(
        r#"        <h1 class="text-3xl font-bold mb-6 text-blue-600 text-center">Kubernetes Resources in Namespace: {namespace}</h1>
        <h2 class="text-2xl font-semibold mb-4 text-gray-800">Pods:</h2>
        {pod_list}
        <h2 class="text-2xl font-semibold mb-4 text-gray-800">Deployments:</h2>
        {deployment_list}
        <p class="mt-8 text-center"><a href="/" class="text-blue-500 font-medium">Back to Home</a></p>"#,
        namespace = escape(namespace),
    );

    page("Kubernetes Resources", "max-w-3xl", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn message(id: i32, content: &str) -> Message {
        Message {
            id,
            content: content.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(12, 30, 5)
                .unwrap(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn home_without_messages() {
        let html = home("Not connected", &[]);
        assert!(html.contains("Database Status: <span class=\"font-semibold\">Not connected</span>"));
        assert!(html.contains("No messages yet"));
    }

    #[test]
    fn home_lists_messages_with_links() {
        let html = home("Connected and data retrieved", &[message(7, "<b>hi</b>")]);

        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>hi</b>"));
        assert!(html.contains("(Added: 2024-05-01 12:30:05)"));
        assert!(html.contains(r#"href="/edit_message/7""#));
        assert!(html.contains(r#"action="/delete_message/7""#));
    }

    #[test]
    fn edit_prefills_escaped_value() {
        let html = edit(&message(3, r#"say "hi""#));
        assert!(html.contains("Edit Message (ID: 3)"));
        assert!(html.contains(r#"value="say &quot;hi&quot;""#));
        assert!(html.contains(r#"action="/edit_message/3""#));
    }

    #[test]
    fn cluster_page_renders_summaries() {
        let pods = vec![PodSummary {
            name: "web-1".into(),
            status: Some("Running".into()),
            ip: None,
            node: Some("node-a".into()),
        }];
        let deployments = vec![DeploymentSummary {
            name: "web".into(),
            replicas: Some(2),
            available_replicas: None,
        }];

        let html = cluster("staging", &pods, &deployments);
        assert!(html.contains("Namespace: staging"));
        assert!(html.contains("web-1"));
        assert!(html.contains("Running"));
        assert!(html.contains("<span class=\"font-medium text-gray-700\">IP:</span> -"));
        assert!(html.contains("<span class=\"font-medium text-gray-700\">Replicas:</span> 2"));
    }

    #[test]
    fn cluster_page_empty_namespace() {
        let html = cluster("default", &[], &[]);
        assert!(html.contains("No pods found in this namespace."));
        assert!(html.contains("No deployments found in this namespace."));
    }
}
