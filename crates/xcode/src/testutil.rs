//! On-disk fixtures for Xcode containers

use std::fs;
use std::path::{Path, PathBuf};

pub const SCHEME_WITH_TESTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme LastUpgradeVersion = "1500" version = "1.7">
   <BuildAction parallelizeBuildables = "YES" buildImplicitDependencies = "YES">
   </BuildAction>
   <TestAction buildConfiguration = "Debug" shouldUseLaunchSchemeArgsEnv = "YES">
      <Testables>
         <TestableReference skipped = "NO">
            <BuildableReference
               BuildableIdentifier = "primary"
               BlueprintIdentifier = "13B07F861A680F5B00A75B9A"
               BuildableName = "AppTests.xctest"
               BlueprintName = "AppTests"
               ReferencedContainer = "container:App.xcodeproj">
            </BuildableReference>
         </TestableReference>
      </Testables>
   </TestAction>
</Scheme>
"#;

pub const SCHEME_WITHOUT_TESTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme LastUpgradeVersion = "1500" version = "1.7">
   <BuildAction parallelizeBuildables = "YES" buildImplicitDependencies = "YES">
      <BuildActionEntries>
         <BuildActionEntry buildForTesting = "YES" buildForRunning = "YES">
            <BuildableReference
               BuildableIdentifier = "primary"
               BuildableName = "App.app"
               BlueprintName = "App"
               ReferencedContainer = "container:App.xcodeproj">
            </BuildableReference>
         </BuildActionEntry>
      </BuildActionEntries>
   </BuildAction>
   <TestAction buildConfiguration = "Debug">
      <Testables>
      </Testables>
   </TestAction>
</Scheme>
"#;

/// Create `<dir>/<name>.xcodeproj` with an empty `project.pbxproj`
pub fn make_project(dir: &Path, name: &str) -> PathBuf {
    let project = dir.join(format!("{name}.xcodeproj"));
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("project.pbxproj"), "// !$*UTF8*$!\n{\n}\n").unwrap();
    project
}

/// Write `<container>/xcshareddata/xcschemes/<name>.xcscheme`
pub fn add_shared_scheme(container: &Path, name: &str, content: &str) -> PathBuf {
    let dir = container.join("xcshareddata").join("xcschemes");
    fs::create_dir_all(&dir).unwrap();
    let file = dir.join(format!("{name}.xcscheme"));
    fs::write(&file, content).unwrap();
    file
}

/// Write `<container>/xcuserdata/<user>.xcuserdatad/xcschemes/<name>.xcscheme`
pub fn add_user_scheme(container: &Path, user: &str, name: &str, content: &str) -> PathBuf {
    let dir = container
        .join("xcuserdata")
        .join(format!("{user}.xcuserdatad"))
        .join("xcschemes");
    fs::create_dir_all(&dir).unwrap();
    let file = dir.join(format!("{name}.xcscheme"));
    fs::write(&file, content).unwrap();
    file
}

/// Create `<dir>/<name>.xcworkspace` whose manifest references `locations`
pub fn make_workspace(dir: &Path, name: &str, locations: &[&str]) -> PathBuf {
    let refs: String = locations
        .iter()
        .map(|location| {
            format!("   <FileRef\n      location = \"{location}\">\n   </FileRef>\n")
        })
        .collect();
    let manifest = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Workspace\n   version = \"1.0\">\n{refs}</Workspace>\n"
    );
    make_workspace_with_manifest(dir, name, &manifest)
}

/// Create `<dir>/<name>.xcworkspace` with a raw manifest
pub fn make_workspace_with_manifest(dir: &Path, name: &str, manifest: &str) -> PathBuf {
    let workspace = dir.join(format!("{name}.xcworkspace"));
    fs::create_dir_all(&workspace).unwrap();
    fs::write(workspace.join("contents.xcworkspacedata"), manifest).unwrap();
    workspace
}
