//! Co-occurrence graphs.
//!
//! Terms become nodes and positive co-occurrences become weighted edges.
//! Nodes are placed with a seeded Fruchterman-Reingold layout, sized and
//! colored by their number of connections.

use std::path::PathBuf;

use ahash::AHashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::exploration::cooccurrence::CooccurrenceMatrix;
use crate::exploration::finish_chart;
use crate::exploration::svg::{Anchor, BLUES, RD_PU, SvgCanvas, TextStyle, color_at};

const LAYOUT_ITERATIONS: usize = 50;
const MARGIN: f32 = 60.0;
const TITLE_HEIGHT: f32 = 40.0;
const COLORBAR_WIDTH: f32 = 90.0;

/// Options of [`cooccurrence_graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Size added to every node.
    pub vmin: f32,
    /// Degree mapped to the full `scale`; the largest degree when unset.
    pub vmax: Option<f32>,
    pub scale: f32,
    /// Nodes kept, by degree: a fraction when in `(0, 1]`, a count above
    /// one, every node when zero.
    pub n_nodes: f32,
    pub seed: u64,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Distance between a node and its label, in layout units.
    pub offset_y: f32,
    pub label_font_size: f32,
    pub node_font_size: f32,
    pub font_color: String,
    pub output: Option<PathBuf>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            vmin: 10.0,
            vmax: None,
            scale: 700.0,
            n_nodes: 0.0,
            seed: 12,
            title: "Gráfico de co-ocurrencias".to_string(),
            width: 1000,
            height: 600,
            offset_y: 0.09,
            label_font_size: 10.0,
            node_font_size: 12.0,
            font_color: "white".to_string(),
            output: None,
        }
    }
}

/// Undirected graph of terms weighted by co-occurrence.
#[derive(Debug, Clone)]
pub struct CooccurrenceGraph {
    pub graph: UnGraph<String, f64>,
}

impl CooccurrenceGraph {
    /// Build the graph of a co-occurrence matrix.
    ///
    /// Each positive off-diagonal value becomes an edge weighing
    /// `value / log10(max value)`, rounded to one decimal. The node
    /// selection of `config.n_nodes` is applied afterwards.
    pub fn from_matrix(matrix: &CooccurrenceMatrix, config: &GraphConfig) -> Result<Self> {
        let max = matrix.max_value() as f64;
        let divisor = if max > 1.0 { max.log10() } else { 1.0 };

        let mut graph: UnGraph<String, f64> = UnGraph::new_undirected();
        let mut nodes: AHashMap<usize, NodeIndex> = AHashMap::new();
        for (i, row) in matrix.values.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                let weight = value as f64 / divisor;
                if i == j || weight <= 0.0 {
                    continue;
                }
                let a = *nodes
                    .entry(i)
                    .or_insert_with(|| graph.add_node(matrix.terms[i].clone()));
                let b = *nodes
                    .entry(j)
                    .or_insert_with(|| graph.add_node(matrix.terms[j].clone()));
                graph.update_edge(a, b, (weight * 10.0).round() / 10.0);
            }
        }

        let mut result = CooccurrenceGraph { graph };
        result.select_nodes(config.n_nodes);
        Ok(result)
    }

    fn select_nodes(&mut self, n_nodes: f32) {
        let total = self.graph.node_count();
        let keep = if n_nodes > 0.0 && n_nodes <= 1.0 {
            (total as f32 * n_nodes) as usize
        } else if n_nodes > 1.0 {
            let n = n_nodes as usize;
            if n > total {
                log::warn!("n_nodes ({n}) exceeds the {total} nodes of the graph; keeping all");
                return;
            }
            n
        } else {
            return;
        };

        let mut order: Vec<NodeIndex> = self.graph.node_indices().collect();
        order.sort_by_key(|&node| std::cmp::Reverse(self.graph.neighbors(node).count()));
        let mut kept = vec![false; total];
        for node in order.into_iter().take(keep) {
            kept[node.index()] = true;
        }

        self.graph = self.graph.filter_map(
            |node, term| kept[node.index()].then(|| term.clone()),
            |_, &weight| Some(weight),
        );
        log::debug!("Kept {} of {total} nodes", self.graph.node_count());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn find(&self, term: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&node| self.graph[node] == term)
    }

    /// Number of connections of a term.
    pub fn degree(&self, term: &str) -> Option<usize> {
        self.find(term).map(|node| self.graph.neighbors(node).count())
    }

    /// Weight of the edge between two terms.
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        let edge = self.graph.find_edge(self.find(a)?, self.find(b)?)?;
        self.graph.edge_weight(edge).copied()
    }

    fn degrees(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|node| self.graph.neighbors(node).count())
            .collect()
    }

    /// Marker area of every node, in node order.
    pub fn node_sizes(&self, config: &GraphConfig) -> Vec<u32> {
        let degrees = self.degrees();
        let vmax = config
            .vmax
            .unwrap_or_else(|| degrees.iter().copied().max().unwrap_or(1) as f32)
            .max(f32::EPSILON);
        degrees
            .iter()
            .map(|&degree| (degree as f32 / vmax * config.scale + config.vmin).max(0.0) as u32)
            .collect()
    }

    /// Force-directed positions in `[-1, 1]`, in node order.
    ///
    /// Nodes repel each other with `k² / d` and edges pull their ends
    /// together with `weight * d² / k`, over a fixed number of cooling
    /// steps from random starting points drawn with `seed`.
    pub fn layout(&self, seed: u64) -> Vec<(f32, f32)> {
        let n = self.graph.node_count();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![(0.0, 0.0)];
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut pos: Vec<(f32, f32)> = (0..n).map(|_| (rng.random(), rng.random())).collect();

        let mut adjacency = vec![vec![0.0f32; n]; n];
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            adjacency[a][b] = *edge.weight() as f32;
            adjacency[b][a] = *edge.weight() as f32;
        }

        let k = (1.0 / n as f32).sqrt();
        let mut temperature = 0.1;
        let cooling = temperature / (LAYOUT_ITERATIONS + 1) as f32;

        for _ in 0..LAYOUT_ITERATIONS {
            let mut displacement = vec![(0.0f32, 0.0f32); n];
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                    let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                    displacement[i].0 += dx * force;
                    displacement[i].1 += dy * force;
                }
            }
            for (p, d) in pos.iter_mut().zip(&displacement) {
                let length = (d.0 * d.0 + d.1 * d.1).sqrt().max(0.01);
                p.0 += d.0 * temperature / length;
                p.1 += d.1 * temperature / length;
            }
            temperature -= cooling;
        }

        rescale(&mut pos);
        pos
    }

    /// Render the graph as SVG.
    pub fn to_svg(&self, config: &GraphConfig) -> String {
        let width = config.width as f32;
        let height = config.height as f32;
        let mut canvas = SvgCanvas::new(width, height, "white");
        canvas.text(
            width / 2.0,
            TITLE_HEIGHT * 0.7,
            &config.title,
            &TextStyle::new(15.0).anchor(Anchor::Middle).bold(),
        );

        let plot_width = (width - 2.0 * MARGIN - COLORBAR_WIDTH).max(1.0);
        let plot_height = (height - 2.0 * MARGIN - TITLE_HEIGHT).max(1.0);
        let to_canvas = |(x, y): (f32, f32)| {
            (
                MARGIN + (x + 1.0) / 2.0 * plot_width,
                MARGIN + TITLE_HEIGHT + (1.0 - y) / 2.0 * plot_height,
            )
        };

        let positions: Vec<(f32, f32)> = self.layout(config.seed).into_iter().map(to_canvas).collect();
        let degrees = self.degrees();
        let sizes = self.node_sizes(config);
        let min_degree = degrees.iter().copied().min().unwrap_or(0) as f32;
        let max_degree = degrees.iter().copied().max().unwrap_or(0) as f32;
        let degree_color = |degree: usize| {
            if max_degree > min_degree {
                color_at(RD_PU, (degree as f32 - min_degree) / (max_degree - min_degree))
            } else {
                color_at(RD_PU, 0.5)
            }
        };

        // Heavier edges drawn last, on top.
        let max_weight = self
            .graph
            .edge_weights()
            .copied()
            .fold(0.0f64, f64::max)
            .max(f64::EPSILON);
        let mut edges: Vec<_> = self.graph.edge_references().collect();
        edges.sort_by(|a, b| a.weight().total_cmp(b.weight()));
        for edge in edges {
            let color = color_at(BLUES, (*edge.weight() / max_weight) as f32);
            canvas.line(
                positions[edge.source().index()],
                positions[edge.target().index()],
                &color,
                1.2,
                false,
            );
        }

        let label_offset = config.offset_y / 2.0 * plot_height;
        let label_style = TextStyle::new(config.label_font_size).anchor(Anchor::Middle);
        let degree_style = TextStyle::new(config.node_font_size)
            .anchor(Anchor::Middle)
            .fill(&config.font_color);
        for node in self.graph.node_indices() {
            let (x, y) = positions[node.index()];
            let radius = (sizes[node.index()] as f32).sqrt() / 2.0;
            canvas.circle((x, y), radius, &degree_color(degrees[node.index()]));
            canvas.text(x, y + config.node_font_size * 0.35, &degrees[node.index()].to_string(), &degree_style);
            canvas.text(x, y + label_offset + radius, &self.graph[node], &label_style);
        }

        draw_colorbar(&mut canvas, width, height, min_degree, max_degree);
        canvas.finish()
    }
}

/// Center on the origin and scale so the farthest coordinate is 1.
fn rescale(pos: &mut [(f32, f32)]) {
    let n = pos.len() as f32;
    let mean_x = pos.iter().map(|p| p.0).sum::<f32>() / n;
    let mean_y = pos.iter().map(|p| p.1).sum::<f32>() / n;
    let mut limit = 0.0f32;
    for p in pos.iter_mut() {
        p.0 -= mean_x;
        p.1 -= mean_y;
        limit = limit.max(p.0.abs()).max(p.1.abs());
    }
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= limit;
            p.1 /= limit;
        }
    }
}

fn draw_colorbar(canvas: &mut SvgCanvas, width: f32, height: f32, min: f32, max: f32) {
    const STEPS: usize = 20;
    let bar_height = height * 0.4;
    let step_height = bar_height / STEPS as f32;
    let x = width - COLORBAR_WIDTH + 10.0;
    let top = (height - bar_height) / 2.0;
    for step in 0..STEPS {
        let t = 1.0 - step as f32 / (STEPS - 1) as f32;
        canvas.rect(x, top + step as f32 * step_height, 15.0, step_height + 0.5, &color_at(RD_PU, t));
    }
    let ticks = TextStyle::new(10.0);
    canvas.text(x + 20.0, top + 8.0, &format!("{max}"), &ticks);
    canvas.text(x + 20.0, top + bar_height, &format!("{min}"), &ticks);
    canvas.text(
        x + 55.0,
        height / 2.0,
        "Número de conexiones",
        &TextStyle::new(10.0).anchor(Anchor::Middle).rotation(90.0),
    );
}

/// Draw a co-occurrence matrix as a graph of terms and return the SVG.
pub fn cooccurrence_graph(matrix: &CooccurrenceMatrix, config: &GraphConfig) -> Result<String> {
    let graph = CooccurrenceGraph::from_matrix(matrix, config)?;
    if graph.edge_count() == 0 {
        return Err(ContextoError::invalid_argument(
            "The co-occurrence matrix has no co-occurrences between different terms",
        ));
    }
    finish_chart(graph.to_svg(config), config.output.as_deref())
}
