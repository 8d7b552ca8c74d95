use anyhow::{Context, Result};
use console::{Emoji, style};
use serde_json::{Map, Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::VizConfig;
use crate::panel::escape_html;
use crate::search::{edge_search_text, node_search_text};
use crate::session::{Explorer, Highlight, fragment_for};

static BROWSER: Emoji<'_, '_> = Emoji("🌐 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

pub async fn run(
    data: Option<&str>,
    config_path: Option<&Path>,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    println!();
    println!(
        "{}",
        style(" bionet - Network Visualization ").bold().reverse()
    );
    println!();

    let mut loaded = super::load(data, config_path).await?;
    let index = loaded.explorer.index();
    println!(
        "{}Loaded {} nodes, {} edges",
        CHECK,
        style(index.nodes().len()).green().bold(),
        style(index.edges().len()).green().bold()
    );

    let html = generate_viz_html(&mut loaded.explorer, &loaded.config.viz)?;

    let html_path = output.unwrap_or_else(|| std::env::temp_dir().join("bionet_viz.html"));
    let mut file = std::fs::File::create(&html_path)
        .with_context(|| format!("Failed to create file: {}", html_path.display()))?;
    file.write_all(html.as_bytes())?;

    if open {
        open_in_browser(&html_path);
        println!();
        println!("{}Visualization opened in browser", BROWSER);
    }

    println!();
    println!(
        "{}File: {}",
        SPARKLE,
        style(html_path.display()).cyan().underlined()
    );
    println!();

    Ok(())
}

fn open_in_browser(path: &Path) {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", path.to_str().unwrap_or("")])
            .spawn()
            .ok();
    }
}

/// JSON safe to inline in a `<script>` element.
fn script_json(value: &impl serde::Serialize) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn generate_viz_html(explorer: &mut Explorer, viz: &VizConfig) -> Result<String> {
    let index = explorer.index();
    let node_count = index.nodes().len();
    let edge_count = index.edges().len();
    let node_ids: Vec<String> = index.nodes().iter().map(|n| n.id.clone()).collect();
    let edge_ids: Vec<String> = index.edges().iter().map(|e| e.id.clone()).collect();

    let nodes_json: Vec<Value> = index
        .nodes()
        .iter()
        .map(|n| {
            let mut node = json!({
                "id": n.id,
                "label": n.display_name(),
                "size": viz.node_size(index.degree(&n.id)),
                "shape": if n.image.is_some() { "circularImage" } else { "dot" },
                "fragment": fragment_for(n.display_name()),
            });
            if let Some(image) = &n.image {
                node["image"] = Value::String(image.clone());
            }
            if let Some(group) = &n.group {
                node["group"] = Value::String(group.clone());
            }
            node
        })
        .collect();

    let edges_json: Vec<Value> = index
        .edges()
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "from": e.from,
                "to": e.to,
                "title": e.label,
            })
        })
        .collect();

    let mut node_search = Map::new();
    for node in index.nodes() {
        node_search.insert(node.id.clone(), Value::String(node_search_text(node)));
    }
    let mut edge_search = Map::new();
    for edge in index.edges() {
        edge_search.insert(edge.id.clone(), Value::String(edge_search_text(edge)));
    }

    // Panels and highlight maps are recorded by selecting each item in turn
    let mut node_panels = Map::new();
    let mut neighbors = Map::new();
    let mut incident = Map::new();
    for id in &node_ids {
        let Some(update) = explorer.select_node(id) else {
            continue;
        };
        node_panels.insert(id.clone(), Value::String(update.html));
        let view = explorer.view();
        let near: Vec<Value> = node_ids
            .iter()
            .filter(|other| view.node_highlight(other) == Some(Highlight::Neighbor))
            .map(|other| Value::String(other.clone()))
            .collect();
        let touching: Vec<Value> = edge_ids
            .iter()
            .filter(|edge| view.edge_highlight(edge) == Some(Highlight::Neighbor))
            .map(|edge| Value::String(edge.clone()))
            .collect();
        neighbors.insert(id.clone(), Value::Array(near));
        incident.insert(id.clone(), Value::Array(touching));
    }
    let mut edge_panels = Map::new();
    for id in &edge_ids {
        if let Some(update) = explorer.select_edge(id) {
            edge_panels.insert(id.clone(), Value::String(update.html));
        }
    }
    explorer.clear();
    debug_assert!(explorer.view().is_default());

    let options = json!({
        "nodes": {
            "borderWidth": 2,
            "font": { "size": 14 },
            "shapeProperties": { "useBorderWithImage": true }
        },
        "edges": { "smooth": { "type": "continuous" } },
        "physics": {
            "solver": "repulsion",
            "repulsion": {
                "nodeDistance": viz.node_distance,
                "springLength": viz.spring_length,
                "springConstant": viz.spring_constant,
                "damping": viz.damping
            },
            "stabilization": { "iterations": viz.stabilization_iterations }
        },
        "interaction": { "hover": true, "tooltipDelay": 200 }
    });

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f7f5f0; color: #2b2b2b; overflow: hidden; height: 100vh; display: flex; flex-direction: column; }}

        #header {{ padding: 12px 24px; background: #ffffff; border-bottom: 1px solid #e2ddd3; display: flex; align-items: center; gap: 24px; flex-shrink: 0; }}
        #header h1 {{ font-size: 1.1em; font-weight: 700; white-space: nowrap; cursor: pointer; }}
        #search {{ width: 280px; border: 1px solid #d0c9bb; border-radius: 8px; padding: 8px 12px; font-size: 0.9em; outline: none; }}
        #search:focus {{ border-color: #8a6d3b; }}
        #search.miss {{ border-color: #c0392b; }}
        #search-status {{ font-size: 0.8em; color: #8a8a8a; }}
        #stats-bar {{ margin-left: auto; font-size: 0.8em; color: #8a8a8a; }}

        #main {{ flex: 1; position: relative; overflow: hidden; display: flex; }}
        #graph {{ flex: 1; height: 100%; }}
        #panel {{ width: 420px; height: 100%; overflow-y: auto; background: #ffffff; border-left: 1px solid #e2ddd3; padding: 24px; }}
        #panel .placeholder {{ color: #8a8a8a; font-style: italic; }}

        .detail img {{ max-width: 160px; border-radius: 50%; display: block; margin-bottom: 8px; }}
        .detail .image-source {{ font-size: 0.75em; color: #8a8a8a; margin-bottom: 12px; }}
        .detail h2 {{ font-size: 1.4em; margin-bottom: 8px; }}
        .detail h3 {{ font-size: 0.8em; text-transform: uppercase; letter-spacing: 1px; color: #8a6d3b; margin: 18px 0 8px; border-bottom: 1px solid #eee6d8; padding-bottom: 4px; }}
        .detail p, .detail li {{ font-size: 0.9em; line-height: 1.5; margin-bottom: 4px; }}
        .detail ul {{ padding-left: 18px; }}
        .detail .endpoint-images {{ display: flex; gap: 12px; }}
        .detail .endpoint-images img {{ max-width: 96px; }}
        a.node-link {{ color: #8a6d3b; text-decoration: none; border-bottom: 1px dotted #8a6d3b; }}
        a.external-link {{ color: #2c6fbb; }}

        .overlay-center {{ position: absolute; top: 50%; left: 40%; transform: translate(-50%, -50%); text-align: center; pointer-events: none; color: #8a8a8a; }}
        #empty-state {{ display: none; }}
    </style>
</head>
<body>
    <div id="header">
        <h1 onclick="clearSelection()">{title}</h1>
        <input id="search" type="text" placeholder="Search people, places, works..." />
        <span id="search-status"></span>
        <div id="stats-bar">{node_count} nodes · {edge_count} connections</div>
    </div>

    <div id="main">
        <div id="graph"></div>
        <div id="loading" class="overlay-center">Loading network...</div>
        <div id="empty-state" class="overlay-center">This network has no nodes.</div>
        <div id="panel"><p class="placeholder">Select a node or connection to see its details.</p></div>
    </div>

    <script>
        const CDNS = [
            'https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.9/vis-network.min.js',
            'https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js'
        ];
        function loadScript(urls, idx) {{
            if (idx >= urls.length) {{
                document.getElementById('loading').textContent = 'Loading failed. Check connection.';
                return;
            }}
            const s = document.createElement('script');
            s.src = urls[idx];
            s.onload = initApp;
            s.onerror = () => loadScript(urls, idx + 1);
            document.head.appendChild(s);
        }}
        loadScript(CDNS, 0);

        const rawNodes = {nodes};
        const rawEdges = {edges};
        const nodePanels = {node_panels};
        const edgePanels = {edge_panels};
        const neighborMap = {neighbors};
        const incidentMap = {incident};
        const nodeSearch = {node_search};
        const edgeSearch = {edge_search};
        const options = {options};

        const DIM_NODE = {{ background: '#e6e2da', border: '#d6d0c4' }};
        const DIM_EDGE = 'rgba(200,195,185,0.3)';
        const NEIGHBOR_EDGE = '#8a6d3b';
        const SELECTED = '#c0392b';

        function initApp() {{
            document.getElementById('loading').style.display = 'none';
            if (rawNodes.length === 0) {{
                document.getElementById('empty-state').style.display = 'block';
                return;
            }}

            const nodes = new vis.DataSet(rawNodes);
            const edges = new vis.DataSet(rawEdges);
            const network = new vis.Network(document.getElementById('graph'), {{ nodes, edges }}, options);
            const panel = document.getElementById('panel');
            const placeholder = panel.innerHTML;

            // Each selection starts from the defaults
            function resetHighlight() {{
                nodes.update(rawNodes.map(n => ({{ id: n.id, color: null, borderWidth: 2 }})));
                edges.update(rawEdges.map(e => ({{ id: e.id, color: null, width: 1 }})));
            }}

            function showPanel(html) {{
                panel.innerHTML = html;
                panel.scrollTop = 0;
            }}

            function selectNode(id, focus) {{
                if (!nodePanels[id]) return false;
                resetHighlight();
                const near = new Set(neighborMap[id] || []);
                const touching = new Set(incidentMap[id] || []);
                nodes.update(rawNodes.filter(n => n.id !== id && !near.has(n.id)).map(n => ({{ id: n.id, color: DIM_NODE }})));
                nodes.update([{{ id, borderWidth: 4, color: {{ border: SELECTED }} }}]);
                edges.update(rawEdges.map(e => touching.has(e.id)
                    ? {{ id: e.id, color: {{ color: NEIGHBOR_EDGE }}, width: 2 }}
                    : {{ id: e.id, color: {{ color: DIM_EDGE }} }}));
                showPanel(nodePanels[id]);
                const node = rawNodes.find(n => n.id === id);
                if (node && window.location.hash !== node.fragment) {{
                    history.replaceState(null, '', node.fragment);
                }}
                if (focus) network.focus(id, {{ scale: 1.2, animation: true }});
                network.selectNodes([id]);
                return true;
            }}

            function selectEdge(id, focus) {{
                if (!edgePanels[id]) return false;
                resetHighlight();
                const edge = rawEdges.find(e => e.id === id);
                nodes.update(rawNodes.filter(n => n.id !== edge.from && n.id !== edge.to).map(n => ({{ id: n.id, color: DIM_NODE }})));
                nodes.update([edge.from, edge.to].map(n => ({{ id: n, borderWidth: 4, color: {{ border: SELECTED }} }})));
                edges.update(rawEdges.map(e => e.id === id
                    ? {{ id: e.id, color: {{ color: SELECTED }}, width: 3 }}
                    : {{ id: e.id, color: {{ color: DIM_EDGE }} }}));
                showPanel(edgePanels[id]);
                if (focus) network.focus(edge.from, {{ scale: 1.0, animation: true }});
                return true;
            }}

            window.clearSelection = () => {{
                resetHighlight();
                network.unselectAll();
                panel.innerHTML = placeholder;
                history.replaceState(null, '', window.location.pathname + window.location.search);
            }};

            network.on('click', p => {{
                if (p.nodes.length > 0) selectNode(p.nodes[0], false);
                else if (p.edges.length > 0) selectEdge(p.edges[0], false);
                else window.clearSelection();
            }});

            panel.addEventListener('click', ev => {{
                const link = ev.target.closest('a.node-link');
                if (!link) return;
                ev.preventDefault();
                selectNode(link.dataset.id, true);
            }});

            // ─── Search ───
            const byName = (a, b) => a.label.localeCompare(b.label) || a.id.localeCompare(b.id);
            const names = n => [n.id.toLowerCase(), n.label.toLowerCase()];

            function search(query) {{
                const q = query.trim().toLowerCase();
                if (!q) return null;
                const tiers = [
                    n => names(n).some(s => s === q),
                    n => names(n).some(s => s.startsWith(q)),
                    n => names(n).some(s => s.includes(q)),
                    n => (nodeSearch[n.id] || '').includes(q),
                ];
                for (const tier of tiers) {{
                    const hits = rawNodes.filter(tier).sort(byName);
                    if (hits.length > 0) return {{ node: hits[0].id }};
                }}
                const edge = rawEdges.find(e => (edgeSearch[e.id] || '').includes(q));
                return edge ? {{ edge: edge.id }} : null;
            }}

            const searchBox = document.getElementById('search');
            const searchStatus = document.getElementById('search-status');
            searchBox.addEventListener('keydown', ev => {{
                if (ev.key !== 'Enter') return;
                const hit = search(searchBox.value);
                searchBox.classList.toggle('miss', !hit);
                if (!hit) {{
                    searchStatus.textContent = 'No match';
                    return;
                }}
                searchStatus.textContent = '';
                if (hit.node) selectNode(hit.node, true);
                else selectEdge(hit.edge, true);
            }});

            // ─── Deep links ───
            function openHash() {{
                const hash = window.location.hash;
                if (!hash || hash === '#') return;
                let node = rawNodes.find(n => n.fragment === hash);
                if (!node) {{
                    let name;
                    try {{ name = decodeURIComponent(hash.slice(1)); }} catch (e) {{ name = hash.slice(1); }}
                    name = name.replace(/_/g, ' ');
                    node = rawNodes.find(n => n.id === name || n.label === name)
                        || rawNodes.find(n => n.label.toLowerCase() === name.toLowerCase());
                }}
                if (node) selectNode(node.id, true);
            }}
            window.addEventListener('hashchange', openHash);
            network.once('stabilizationIterationsDone', openHash);
        }}
    </script>
</body>
</html>"#,
        title = escape_html(&viz.title),
        node_count = node_count,
        edge_count = edge_count,
        nodes = script_json(&nodes_json)?,
        edges = script_json(&edges_json)?,
        node_panels = script_json(&node_panels)?,
        edge_panels = script_json(&edge_panels)?,
        neighbors = script_json(&neighbors)?,
        incident = script_json(&incident)?,
        node_search = script_json(&node_search)?,
        edge_search = script_json(&edge_search)?,
        options = script_json(&options)?,
    );

    Ok(html)
}
