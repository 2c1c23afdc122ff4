//! Geometric net extraction.
//!
//! Wire segments that share an endpoint (or end on another segment's body)
//! form one electrical net. Flags name the net they touch, and same-named
//! flags join their nets across the sheet. Symbol pins are located from the
//! built-in pin table and attached to the net under them. All matching is
//! exact integer comparison on the LTspice grid.
//!
//! The output stays in memory; nothing here emits SPICE text.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;
use serde::Serialize;

use crate::parser::schema::{Point, Schematic};

/// A symbol pin resolved onto a net.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PinConnection {
    /// `InstName` of the symbol, or its library name when unnamed.
    pub instance: String,
    /// 1-based pin number within the symbol template.
    pub pin: usize,
    pub at: Point,
}

/// One extracted electrical net.
#[derive(Debug, Clone, Serialize)]
pub struct Net {
    /// Resolved name: the first flag name on the net, or a synthetic
    /// `N001`-style name when no flag touches it.
    pub name: String,
    /// Every distinct flag name seen on the net. More than one entry means
    /// the drawing shorts two labels together.
    pub names: Vec<String>,
    /// Indices into `Schematic::wires`.
    pub wires: Vec<usize>,
    /// Indices into `Schematic::flags`.
    pub flags: Vec<usize>,
    pub pins: Vec<PinConnection>,
}

impl Net {
    pub fn is_ground(&self) -> bool {
        self.name == "0"
    }
}

/// Pin sites for every symbol with known geometry, in schematic order.
pub fn pin_sites(schematic: &Schematic) -> Vec<PinConnection> {
    let mut sites = Vec::new();
    for sym in &schematic.symbols {
        let Some(pins) = sym.pin_positions() else {
            continue;
        };
        let instance = sym
            .inst_name()
            .map(str::to_owned)
            .unwrap_or_else(|| sym.symbol.clone());
        for (i, at) in pins.into_iter().enumerate() {
            sites.push(PinConnection {
                instance: instance.clone(),
                pin: i + 1,
                at,
            });
        }
    }
    sites
}

/// Geometric net extractor.
pub struct NetExtractor;

impl NetExtractor {
    /// Extract every net in the schematic. Nets are ordered deterministically
    /// (lowest wire index first), so output and synthetic names are stable.
    pub fn extract(schematic: &Schematic) -> Vec<Net> {
        let sites = pin_sites(schematic);
        let n_wires = schematic.wires.len();

        // Node space: one node per wire, then one per distinct loose point
        // (flag anchors and pin sites).
        let mut point_ids: HashMap<Point, usize> = HashMap::new();
        let flag_nodes: Vec<usize> = schematic
            .flags
            .iter()
            .map(|f| loose_node(&mut point_ids, n_wires, f.at))
            .collect();
        let pin_nodes: Vec<usize> = sites
            .iter()
            .map(|p| loose_node(&mut point_ids, n_wires, p.at))
            .collect();

        let mut uf = UnionFind::<usize>::new(n_wires + point_ids.len());

        // Wires touching wires: shared endpoint or endpoint on body.
        for i in 0..n_wires {
            for j in (i + 1)..n_wires {
                let a = &schematic.wires[i];
                let b = &schematic.wires[j];
                if b.contains(a.a) || b.contains(a.b) || a.contains(b.a) || a.contains(b.b) {
                    uf.union(i, j);
                }
            }
        }

        // Loose points touching wires.
        for (&p, &node) in &point_ids {
            for (i, w) in schematic.wires.iter().enumerate() {
                if w.contains(p) {
                    uf.union(node, i);
                }
            }
        }

        // Same-named flags connect their nets even without a wire between
        // them; that is what a net label means.
        let mut name_first: HashMap<&str, usize> = HashMap::new();
        for (fi, flag) in schematic.flags.iter().enumerate() {
            match name_first.get(flag.net.as_str()) {
                Some(&node) => {
                    uf.union(node, flag_nodes[fi]);
                }
                None => {
                    name_first.insert(&flag.net, flag_nodes[fi]);
                }
            }
        }

        // Collect groups.
        let mut groups: HashMap<usize, Net> = HashMap::new();
        let mut order: HashMap<usize, (usize, Point)> = HashMap::new();

        for i in 0..n_wires {
            let root = uf.find(i);
            let net = groups.entry(root).or_insert_with(Net::empty);
            net.wires.push(i);
            let key = order
                .entry(root)
                .or_insert((i, schematic.wires[i].a.min(schematic.wires[i].b)));
            key.0 = key.0.min(i);
        }
        for (fi, flag) in schematic.flags.iter().enumerate() {
            let root = uf.find(flag_nodes[fi]);
            let net = groups.entry(root).or_insert_with(Net::empty);
            net.flags.push(fi);
            if !net.names.iter().any(|n| n == &flag.net) {
                net.names.push(flag.net.clone());
            }
            order.entry(root).or_insert((usize::MAX, flag.at));
        }
        for (pi, site) in sites.iter().enumerate() {
            let root = uf.find(pin_nodes[pi]);
            let net = groups.entry(root).or_insert_with(Net::empty);
            net.pins.push(site.clone());
            order.entry(root).or_insert((usize::MAX, site.at));
        }

        // A group with a single member is not a net: a lone flag is floating
        // and a lone pin is unconnected. The lint rules report those.
        let mut nets: Vec<(usize, Net)> = groups
            .into_iter()
            .filter(|(_, n)| n.member_count() > 1 || !n.wires.is_empty())
            .collect();
        nets.sort_by_key(|(root, _)| order[root]);

        let mut unnamed = 0usize;
        nets.into_iter()
            .map(|(_, mut net)| {
                net.name = match net.names.first() {
                    Some(name) => name.clone(),
                    None => {
                        unnamed += 1;
                        format!("N{unnamed:03}")
                    }
                };
                net.pins
                    .sort_by(|a, b| (&a.instance, a.pin).cmp(&(&b.instance, b.pin)));
                net
            })
            .collect()
    }
}

impl Net {
    fn empty() -> Self {
        Self {
            name: String::new(),
            names: Vec::new(),
            wires: Vec::new(),
            flags: Vec::new(),
            pins: Vec::new(),
        }
    }

    fn member_count(&self) -> usize {
        self.wires.len() + self.flags.len() + self.pins.len()
    }
}

fn loose_node(point_ids: &mut HashMap<Point, usize>, n_wires: usize, p: Point) -> usize {
    let next = n_wires + point_ids.len();
    *point_ids.entry(p).or_insert(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::asc::AscParser;

    fn parse(src: &str) -> Schematic {
        AscParser::parse_str(src).unwrap()
    }

    #[test]
    fn shared_endpoints_merge_wires() {
        let sch = parse(
            "Version 4\nSHEET 1 880 680\n\
             WIRE 0 0 100 0\nWIRE 100 0 100 100\nWIRE 200 200 300 200\n",
        );
        let nets = NetExtractor::extract(&sch);
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0].wires, vec![0, 1]);
        assert_eq!(nets[1].wires, vec![2]);
        assert_eq!(nets[0].name, "N001");
        assert_eq!(nets[1].name, "N002");
    }

    #[test]
    fn endpoint_on_wire_body_is_a_junction() {
        let sch = parse(
            "Version 4\nSHEET 1 880 680\n\
             WIRE 0 0 100 0\nWIRE 50 0 50 80\n",
        );
        let nets = NetExtractor::extract(&sch);
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].wires, vec![0, 1]);
    }

    #[test]
    fn flags_name_their_net() {
        let sch = parse(
            "Version 4\nSHEET 1 880 680\n\
             WIRE 0 0 100 0\nFLAG 0 0 vin\n",
        );
        let nets = NetExtractor::extract(&sch);
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].name, "vin");
        assert_eq!(nets[0].flags, vec![0]);
    }

    #[test]
    fn same_named_flags_join_disjoint_wires() {
        let sch = parse(
            "Version 4\nSHEET 1 880 680\n\
             WIRE 0 0 100 0\nWIRE 200 200 300 200\n\
             FLAG 0 0 node\nFLAG 300 200 node\n",
        );
        let nets = NetExtractor::extract(&sch);
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].wires, vec![0, 1]);
        assert_eq!(nets[0].names, vec!["node"]);
    }

    #[test]
    fn pins_attach_to_wires_under_them() {
        // cap at (80, -16) R0: pins at (96, 0) and (96, 48).
        let sch = parse(
            "Version 4\nSHEET 1 880 680\n\
             WIRE 0 0 96 0\nWIRE 96 48 96 96\n\
             FLAG 96 96 0\n\
             SYMBOL cap 80 -16 R0\nSYMATTR InstName C1\nSYMATTR Value 1\n",
        );
        let nets = NetExtractor::extract(&sch);
        assert_eq!(nets.len(), 2);
        let top = &nets[0];
        assert_eq!(top.pins.len(), 1);
        assert_eq!(top.pins[0].instance, "C1");
        assert_eq!(top.pins[0].pin, 1);
        let ground = nets.iter().find(|n| n.is_ground()).unwrap();
        assert_eq!(ground.pins[0].pin, 2);
    }

    #[test]
    fn flag_directly_on_pin_makes_a_net() {
        // No wire at all: ground flag sits straight on the cap's pin 2.
        let sch = parse(
            "Version 4\nSHEET 1 880 680\n\
             FLAG 96 48 0\n\
             SYMBOL cap 80 -16 R0\nSYMATTR InstName C1\n",
        );
        let nets = NetExtractor::extract(&sch);
        assert_eq!(nets.len(), 1);
        assert!(nets[0].is_ground());
        assert_eq!(nets[0].pins.len(), 1);
    }

    #[test]
    fn lone_flag_is_not_a_net() {
        let sch = parse("Version 4\nSHEET 1 880 680\nFLAG 400 400 orphan\n");
        assert!(NetExtractor::extract(&sch).is_empty());
    }

    #[test]
    fn unknown_symbols_contribute_no_pins() {
        let sch = parse(
            "Version 4\nSHEET 1 880 680\nSYMBOL opamp 0 0 R0\nSYMATTR InstName U1\n",
        );
        assert!(pin_sites(&sch).is_empty());
    }
}
