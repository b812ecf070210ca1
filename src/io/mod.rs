//! Diagnostic output.

mod dump;

pub use dump::{
    dump_cell_field, dump_cell_field_on_nodes, dump_edge_field, dump_mesh_triplot,
    dump_node_field, DumpError,
};
