//! JSON command protocol for scripted sessions.
//!
//! Parts are addressed by their row path from the root (`[0, 2]` is the third
//! child of the first top-level part), the same addressing a tree view uses.

use serde::{Deserialize, Serialize};
use shared::{Axis, Rgb};

use crate::session::ViewerSession;
use crate::tree::PartId;

/// A command a script can execute
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ViewerCommand {
    /// Add a part under `parent` (top level when omitted)
    AddPart {
        name: String,
        #[serde(default)]
        parent: Option<Vec<usize>>,
    },
    /// Remove `count` rows starting at `row`
    RemoveParts {
        #[serde(default)]
        parent: Option<Vec<usize>>,
        row: usize,
        #[serde(default = "one")]
        count: usize,
    },
    /// Change any subset of a part's properties
    SetProperties {
        path: Vec<usize>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        color: Option<Rgb>,
        #[serde(default)]
        clip: Option<bool>,
        #[serde(default)]
        shrink: Option<bool>,
    },
    /// Load an STL file into a part
    LoadMesh { path: Vec<usize>, file: String },
    StartVr,
    Rotate { axis: Axis, degrees: f64 },
    StopVr,
    /// List every part and the headset state
    Inspect,
}

fn one() -> usize {
    1
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn resolve(session: &ViewerSession, path: Option<&[usize]>) -> Result<PartId, CommandResponse> {
    let path = path.unwrap_or(&[]);
    session
        .tree
        .node_at_path(path)
        .ok_or_else(|| CommandResponse::err(format!("No part at path {path:?}")))
}

/// Execute a single command on the session.
pub fn execute_command(session: &mut ViewerSession, cmd: ViewerCommand) -> CommandResponse {
    match cmd {
        ViewerCommand::AddPart { name, parent } => {
            let parent = match resolve(session, parent.as_deref()) {
                Ok(id) => id,
                Err(resp) => return resp,
            };
            match session.add_part(Some(parent), &name) {
                Some(id) => CommandResponse::ok_with_data(serde_json::json!({
                    "path": session.tree.path_of(id),
                })),
                None => CommandResponse::err("Failed to add part"),
            }
        }

        ViewerCommand::RemoveParts { parent, row, count } => {
            let parent = match resolve(session, parent.as_deref()) {
                Ok(id) => id,
                Err(resp) => return resp,
            };
            if session.tree.remove_children(parent, row, count) {
                session.push_status(format!("Removed {count} parts"));
                CommandResponse::ok_with_data(serde_json::json!({ "removed": count }))
            } else {
                CommandResponse::err(format!("Rows {row}..{} out of range", row.saturating_add(count)))
            }
        }

        ViewerCommand::SetProperties {
            path,
            name,
            visible,
            color,
            clip,
            shrink,
        } => {
            let id = match resolve(session, Some(path.as_slice())) {
                Ok(id) if id != session.tree.root() => id,
                Ok(_) => return CommandResponse::err("The root has no properties"),
                Err(resp) => return resp,
            };
            let Some(mut props) = session.tree.properties(id) else {
                return CommandResponse::err("Part disappeared");
            };
            if let Some(name) = name {
                props.name = name;
            }
            if let Some(visible) = visible {
                props.visible = visible;
            }
            if let Some(color) = color {
                props.color = color;
            }
            if let Some(clip) = clip {
                props.clip = clip;
            }
            if let Some(shrink) = shrink {
                props.shrink = shrink;
            }
            session.tree.apply_properties(id, &props);
            CommandResponse::ok_with_data(serde_json::json!({ "properties": props }))
        }

        ViewerCommand::LoadMesh { path, file } => {
            let id = match resolve(session, Some(path.as_slice())) {
                Ok(id) if id != session.tree.root() => id,
                Ok(_) => return CommandResponse::err("The root cannot hold a mesh"),
                Err(resp) => return resp,
            };
            match session.load_mesh(id, std::path::Path::new(&file)) {
                Ok(()) => {
                    let triangles = session
                        .tree
                        .node(id)
                        .and_then(|n| n.mesh())
                        .map_or(0, |m| m.triangle_count());
                    CommandResponse::ok_with_data(serde_json::json!({ "triangles": triangles }))
                }
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        ViewerCommand::StartVr => match session.start_vr() {
            Ok(()) => CommandResponse::ok(),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ViewerCommand::Rotate { axis, degrees } => {
            if session.rotate(axis, degrees) {
                CommandResponse::ok()
            } else {
                CommandResponse::err("VR is not running")
            }
        }

        ViewerCommand::StopVr => {
            let stopped = session.stop_vr();
            CommandResponse::ok_with_data(serde_json::json!({ "stopped": stopped }))
        }

        ViewerCommand::Inspect => {
            session.poll();
            let tree = &session.tree;
            let parts: Vec<serde_json::Value> = tree
                .descendants(tree.root())
                .into_iter()
                .map(|id| {
                    serde_json::json!({
                        "path": tree.path_of(id),
                        "name": tree.name(id),
                        "visible": tree.is_visible(id),
                        "color": tree.color(id),
                        "filters": tree.filters(id),
                        "has_mesh": tree.has_mesh(id),
                        "children": tree.child_count(id),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "part_count": parts.len(),
                "parts": parts,
                "vr_state": format!("{:?}", session.vr_state()),
            }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(session: &mut ViewerSession, json: &str) -> Result<CommandResponse, String> {
    let cmd: ViewerCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(session, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    session: &mut ViewerSession,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ViewerCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(session, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_add_part() {
        let json = r#"{"command": "add_part", "name": "Wheel", "parent": [0]}"#;
        let cmd: ViewerCommand = serde_json::from_str(json).unwrap();
        match cmd {
            ViewerCommand::AddPart { name, parent } => {
                assert_eq!(name, "Wheel");
                assert_eq!(parent, Some(vec![0]));
            }
            _ => panic!("Expected AddPart"),
        }
    }

    #[test]
    fn test_command_serde_rotate() {
        let json = r#"{"command": "rotate", "axis": "z", "degrees": -15.0}"#;
        let cmd: ViewerCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, ViewerCommand::Rotate { axis: Axis::Z, degrees } if degrees == -15.0));
    }

    #[test]
    fn test_remove_parts_defaults_to_one_row() {
        let json = r#"{"command": "remove_parts", "row": 2}"#;
        let cmd: ViewerCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, ViewerCommand::RemoveParts { parent: None, row: 2, count: 1 }));
    }

    #[test]
    fn test_execute_add_and_inspect() {
        let mut s = ViewerSession::default();
        let resp = execute_json(&mut s, r#"{"command": "add_part", "name": "Body"}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["path"], serde_json::json!([0]));

        let resp = execute_json(&mut s, r#"{"command": "add_part", "name": "Door", "parent": [0]}"#).unwrap();
        assert_eq!(resp.data.unwrap()["path"], serde_json::json!([0, 0]));

        let resp = execute_json(&mut s, r#"{"command": "inspect"}"#).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data["part_count"], 2);
        assert_eq!(data["parts"][1]["name"], "Door");
        assert_eq!(data["vr_state"], "Idle");
    }

    #[test]
    fn test_execute_set_properties() {
        let mut s = ViewerSession::default();
        s.add_part(None, "Lid");
        let json = r#"{"command": "set_properties", "path": [0], "visible": false, "color": {"r": 255, "g": 0, "b": 0}}"#;
        let resp = execute_json(&mut s, json).unwrap();
        assert!(resp.success);

        let id = s.tree.node_at_path(&[0]).unwrap();
        assert!(!s.tree.is_visible(id));
        assert_eq!(s.tree.color(id), Some(Rgb::new(255, 0, 0)));
        assert_eq!(s.tree.name(id), "Lid");
    }

    #[test]
    fn test_execute_bad_path() {
        let mut s = ViewerSession::default();
        let resp = execute_json(&mut s, r#"{"command": "load_mesh", "path": [3], "file": "x.stl"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("[3]"));

        let resp = execute_json(&mut s, r#"{"command": "set_properties", "path": []}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_rotate_without_vr() {
        let mut s = ViewerSession::default();
        let resp = execute_json(&mut s, r#"{"command": "rotate", "axis": "x", "degrees": 5.0}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_batch() {
        let mut s = ViewerSession::default();
        let json = r#"[
            {"command": "add_part", "name": "A"},
            {"command": "add_part", "name": "B"},
            {"command": "remove_parts", "row": 0},
            {"command": "remove_parts", "row": 5}
        ]"#;
        let responses = execute_json_batch(&mut s, json).unwrap();
        let ok: Vec<bool> = responses.iter().map(|r| r.success).collect();
        assert_eq!(ok, vec![true, true, true, false]);
        assert_eq!(s.tree.name(s.tree.node_at_path(&[0]).unwrap()), "B");
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut s = ViewerSession::default();
        assert!(execute_json(&mut s, "not valid json").is_err());
        assert!(execute_json(&mut s, r#"{"command": "explode"}"#).is_err());
    }
}
