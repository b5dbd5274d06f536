use log::{debug, error};
use render_trait::{RenderError, RenderResult, ShaderStage};

use crate::gpu::Gpu;

const COLOUR_VERT: &str = r#"
#version 150

uniform vec2 translation;
uniform mat4 projection;

in vec2 vertexPosition;
in vec4 vertexColor;

out vec4 fragColor;

void main() {
    fragColor = vertexColor;
    gl_Position = projection * vec4(vertexPosition + translation, 0.0, 1.0);
}"#;

const COLOUR_FRAG: &str = r#"
#version 150

in vec4 fragColor;

out vec4 finalColor;

void main() {
    finalColor = fragColor;
}"#;

const TEXTURE_VERT: &str = r#"
#version 150

uniform vec2 translation;
uniform mat4 projection;

in vec2 vertexPosition;
in vec4 vertexColor;
in vec2 vertexTexCoord;

out vec2 texCoord;
out vec4 fragColor;

void main() {
    texCoord = vertexTexCoord;
    fragColor = vertexColor;
    gl_Position = projection * vec4(vertexPosition + translation, 0.0, 1.0);
}"#;

const TEXTURE_FRAG: &str = r#"
#version 150

uniform sampler2D texSampler;

in vec2 texCoord;
in vec4 fragColor;

out vec4 finalColor;

void main() {
    finalColor = texture(texSampler, texCoord) * fragColor;
}"#;

/// Attribute and uniform locations, looked up once after linking
pub struct ProgramLocations<G: Gpu> {
    pub position: u32,
    pub colour: u32,
    /// Only the texture program has one
    pub tex_coord: Option<u32>,
    pub translation: Option<G::UniformLocation>,
    pub projection: Option<G::UniformLocation>,
    pub sampler: Option<G::UniformLocation>,
}

pub struct ShaderProgram<G: Gpu> {
    pub id: G::Program,
    pub locations: ProgramLocations<G>,
}

impl<G: Gpu> ShaderProgram<G> {
    fn new(
        gpu: &G,
        name: &'static str,
        vert: &str,
        frag: &str,
        textured: bool,
    ) -> RenderResult<Self> {
        let id = link(
            gpu,
            name,
            [(ShaderStage::Vertex, vert), (ShaderStage::Fragment, frag)],
        )?;

        let locations = locate(gpu, id, name, textured);

        match locations {
            Ok(locations) => {
                debug!("Linked {name} shader program {id:?}");
                Ok(Self { id, locations })
            }
            Err(e) => {
                error!("{e}");
                gpu.delete_program(id);
                Err(e)
            }
        }
    }

    fn set_projection(&self, gpu: &G, projection: &[f32; 16]) {
        gpu.use_program(Some(self.id));
        gpu.uniform_matrix_4(self.locations.projection.as_ref(), projection);
    }
}

fn locate<G: Gpu>(
    gpu: &G,
    id: G::Program,
    name: &'static str,
    textured: bool,
) -> RenderResult<ProgramLocations<G>> {
    let attrib = |attr: &str| {
        gpu.attrib_location(id, attr)
            .ok_or_else(|| RenderError::ShaderLink {
                program: name,
                log: format!("attribute {attr} is not active"),
            })
    };

    Ok(ProgramLocations {
        position: attrib("vertexPosition")?,
        colour: attrib("vertexColor")?,
        tex_coord: if textured {
            Some(attrib("vertexTexCoord")?)
        } else {
            None
        },
        translation: gpu.uniform_location(id, "translation"),
        projection: gpu.uniform_location(id, "projection"),
        sampler: if textured {
            gpu.uniform_location(id, "texSampler")
        } else {
            None
        },
    })
}

/// Compile each stage, attach, link. Shader objects never outlive this call
/// and nothing is left behind on failure.
fn link<G: Gpu>(
    gpu: &G,
    name: &'static str,
    sources: [(ShaderStage, &str); 2],
) -> RenderResult<G::Program> {
    let program = gpu.create_program().map_err(RenderError::GpuAllocation)?;
    let mut shaders = Vec::with_capacity(sources.len());

    let discard = |shaders: &[G::Shader]| {
        for shader in shaders {
            gpu.detach_shader(program, *shader);
            gpu.delete_shader(*shader);
        }
        gpu.delete_program(program);
    };

    for (stage, source) in sources {
        let shader = match gpu.create_shader(stage) {
            Ok(shader) => shader,
            Err(e) => {
                discard(&shaders);
                return Err(RenderError::GpuAllocation(e));
            }
        };
        gpu.compile_shader(shader, source);
        if !gpu.shader_compile_status(shader) {
            let log = gpu.shader_info_log(shader);
            error!("Could not compile {name} {stage} shader: {log}");
            gpu.delete_shader(shader);
            discard(&shaders);
            return Err(RenderError::ShaderCompile {
                program: name,
                stage,
                log,
            });
        }
        gpu.attach_shader(program, shader);
        shaders.push(shader);
    }

    gpu.link_program(program);
    if !gpu.program_link_status(program) {
        let log = gpu.program_info_log(program);
        error!("Could not link {name} shader program: {log}");
        discard(&shaders);
        return Err(RenderError::ShaderLink { program: name, log });
    }

    for shader in shaders {
        gpu.detach_shader(program, shader);
        gpu.delete_shader(shader);
    }
    Ok(program)
}

/// The two pipelines every draw picks from
pub struct ShaderPrograms<G: Gpu> {
    pub colour: ShaderProgram<G>,
    pub texture: ShaderProgram<G>,
}

impl<G: Gpu> ShaderPrograms<G> {
    pub fn new(gpu: &G) -> RenderResult<Self> {
        let colour = ShaderProgram::new(gpu, "colour", COLOUR_VERT, COLOUR_FRAG, false)?;
        let texture = match ShaderProgram::new(gpu, "texture", TEXTURE_VERT, TEXTURE_FRAG, true) {
            Ok(texture) => texture,
            Err(e) => {
                gpu.delete_program(colour.id);
                return Err(e);
            }
        };

        // Only unit 0 is ever used
        gpu.use_program(Some(texture.id));
        gpu.uniform_1_i32(texture.locations.sampler.as_ref(), 0);
        gpu.use_program(None);

        Ok(Self { colour, texture })
    }

    pub fn select(&self, textured: bool) -> &ShaderProgram<G> {
        if textured { &self.texture } else { &self.colour }
    }

    /// Upload a column-major projection to both programs
    pub fn set_projection(&self, gpu: &G, projection: &[f32; 16]) {
        self.colour.set_projection(gpu, projection);
        self.texture.set_projection(gpu, projection);
        gpu.use_program(None);
    }

    pub fn destroy(&self, gpu: &G) {
        gpu.use_program(None);
        gpu.delete_program(self.texture.id);
        gpu.delete_program(self.colour.id);
    }
}
