//! Built-in modeler: tessellated bolt proxies exported as ASCII STL.

use std::path::Path;

use log::debug;

use crate::domain::{BoltSpec, ThreadDesignation, ThreadSpec};
use crate::io::write_ascii_stl;
use crate::modeler::mesh::{TriangleMesh, bolt_mesh};
use crate::modeler::{BoltModeler, BuildError};

/// Thread major diameter may exceed the shank by at most this fraction.
const THREAD_OVERSIZE_TOLERANCE: f64 = 0.10;

/// STL output is in millimetres; specs are in centimetres.
const STL_SCALE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct MeshModel {
    spec: BoltSpec,
    mesh: TriangleMesh,
    thread: Option<ThreadDesignation>,
}

impl MeshModel {
    pub fn thread(&self) -> Option<&ThreadDesignation> {
        self.thread.as_ref()
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }
}

/// Reference `BoltModeler` used by the CLI.
#[derive(Debug, Default)]
pub struct MeshModeler {
    live_models: usize,
}

impl MeshModeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models built and not yet discarded.
    pub fn live_models(&self) -> usize {
        self.live_models
    }
}

impl BoltModeler for MeshModeler {
    type Model = MeshModel;

    fn build_body(&mut self, spec: &BoltSpec) -> Result<MeshModel, BuildError> {
        let dims = [
            ("head diameter", spec.head_diameter),
            ("body diameter", spec.body_diameter),
            ("head height", spec.head_height),
            ("body length", spec.body_length),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(BuildError::Body(format!("{name} must be positive, got {value}")));
            }
        }
        if spec.head_diameter <= spec.body_diameter {
            return Err(BuildError::Body(format!(
                "head diameter {} does not overhang body diameter {}",
                spec.head_diameter, spec.body_diameter
            )));
        }

        let mesh = bolt_mesh(spec);
        debug!("{}: body built ({} triangles)", spec.name, mesh.triangle_count());
        self.live_models += 1;
        Ok(MeshModel {
            spec: spec.clone(),
            mesh,
            thread: None,
        })
    }

    fn create_thread(
        &mut self,
        model: &mut MeshModel,
        thread: &ThreadSpec,
        designation: &ThreadDesignation,
    ) -> Result<(), BuildError> {
        let fail = |message: String| BuildError::Thread {
            designation: designation.to_string(),
            message,
        };

        let shank_mm = model.spec.body_diameter * STL_SCALE;
        if designation.size > shank_mm * (1.0 + THREAD_OVERSIZE_TOLERANCE) {
            return Err(fail(format!(
                "nominal size exceeds the {shank_mm:.2} mm shank"
            )));
        }
        if let Some(pitch) = designation.pitch {
            if !(pitch > 0.0 && pitch < designation.size) {
                return Err(fail(format!("pitch {pitch} is not valid for this size")));
            }
        }

        debug!(
            "{}: thread {designation} ({}, class {})",
            model.spec.name,
            thread.profile.display_name(),
            thread.class
        );
        model.thread = Some(*designation);
        Ok(())
    }

    fn export(&mut self, model: &MeshModel, path: &Path) -> Result<(), BuildError> {
        let name = match &model.thread {
            Some(designation) => format!("{}_{designation}", model.spec.name),
            None => model.spec.name.clone(),
        };
        write_ascii_stl(path, &name, &model.mesh, STL_SCALE)
            .map_err(|e| BuildError::Export(e.message().to_string()))
    }

    fn discard(&mut self, model: MeshModel) {
        debug!("{}: model deleted", model.spec.name);
        self.live_models = self.live_models.saturating_sub(1);
    }
}
