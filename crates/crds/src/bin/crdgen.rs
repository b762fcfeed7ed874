//! Prints the CRD manifests for installation with `kubectl apply -f -`.

use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&crds::FloatingIPBinding::crd())?);
    Ok(())
}
